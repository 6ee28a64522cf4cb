//! qBittorrent WebUI client implementation.

use tracing::debug;

use qbt_rules_types::{
    AddSource, Categories, ClientError, Degraded, TorrentClient, TorrentEntry, Tracker,
};

use crate::conversions::{check_status, decode_json, degrade, form_bool};
use crate::ops::{WebUi, WebUiOps};


const LOGIN: &str = "api/v2/auth/login";
const ADD: &str = "api/v2/torrents/add";
const INFO: &str = "api/v2/torrents/info";
const TRACKERS: &str = "api/v2/torrents/trackers";
const CATEGORIES: &str = "api/v2/torrents/categories";
const CREATE_CATEGORY: &str = "api/v2/torrents/createCategory";
const SET_CATEGORY: &str = "api/v2/torrents/setCategory";
const SET_UPLOAD_LIMIT: &str = "api/v2/torrents/setUploadLimit";
const REMOVE_TAGS: &str = "api/v2/torrents/removeTags";
const RESUME: &str = "api/v2/torrents/resume";
// qBittorrent 5 renamed resume to start.
const START: &str = "api/v2/torrents/start";

/// QbittorrentClient is a [`TorrentClient`] that drives the qBittorrent WebUI API.
#[allow(missing_debug_implementations, private_bounds)]
pub struct QbittorrentClient<T: WebUiOps = WebUi> {
    client: T,
}

impl QbittorrentClient {
    /// Create a new QbittorrentClient for the WebUI at `base_url`.
    ///
    /// No request is sent until [`TorrentClient::login`].
    pub fn try_new(base_url: &str, insecure: bool) -> Result<Self, ClientError> {
        debug!("Using qBittorrent WebUI at {base_url}, insecure={insecure}");
        Ok(Self {
            client: WebUi::try_new(base_url, insecure)?,
        })
    }
}

#[allow(private_bounds)]
impl<T: WebUiOps> QbittorrentClient<T> {
    /// Create a QbittorrentClient with a custom transport.
    /// This is primarily useful for testing with mocks.
    #[cfg(test)]
    pub(crate) fn with_client(client: T) -> Self {
        Self { client }
    }
}

#[allow(private_bounds)]
impl<T: WebUiOps> TorrentClient for QbittorrentClient<T> {
    async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), ClientError> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ClientError::MissingCredentials);
        };

        debug!("Logging in as {username}");
        let response = self
            .client
            .post_form(
                LOGIN,
                vec![
                    ("username", username.to_string()),
                    ("password", password.to_string()),
                ],
            )
            .await?;
        if response.status != 200 || response.body != "Ok." {
            return Err(ClientError::LoginRejected {
                status: response.status,
                body: response.body,
            });
        }

        debug!("Logged in");
        Ok(())
    }

    async fn add(&self, source: &AddSource, tag: &str, paused: bool) -> Result<(), ClientError> {
        debug!("Adding {source:?} with tag {tag}, paused={paused}");
        // `paused` is read up to WebUI 2.10, `stopped` from 2.11 on.
        let mut form = vec![
            ("paused", form_bool(paused)),
            ("stopped", form_bool(paused)),
            ("tags", tag.to_string()),
        ];
        let response = match source {
            AddSource::Magnet(uri) => {
                form.push(("urls", uri.clone()));
                self.client.post_form(ADD, form).await?
            }
            AddSource::TorrentFile {
                file_name,
                contents,
            } => {
                self.client
                    .post_torrent_file(ADD, form, file_name.clone(), contents.clone())
                    .await?
            }
        };

        let response = check_status("add", response)?;
        // Older WebUIs answer 200 with `Fails.` when nothing was added.
        if response.body.trim() == "Fails." {
            return Err(ClientError::ServerError {
                call: "add",
                status: response.status,
                body: response.body,
            });
        }

        debug!("Add command accepted");
        Ok(())
    }

    async fn torrents_by_tag(&self, tag: &str) -> Result<Vec<TorrentEntry>, ClientError> {
        debug!("Listing torrents tagged {tag}");
        let response = self.client.get(INFO, vec![("tag", tag.to_string())]).await?;
        let torrents: Vec<TorrentEntry> = decode_json("info", response)?;
        debug!("Torrents tagged {tag}: {torrents:?}");

        Ok(torrents)
    }

    async fn trackers(&self, hash: &str) -> Result<Vec<Tracker>, ClientError> {
        debug!("Getting trackers for {hash}");
        let response = self
            .client
            .get(TRACKERS, vec![("hash", hash.to_string())])
            .await?;
        let trackers: Vec<Tracker> = decode_json("trackers", response)?;
        debug!("Trackers for {hash}: {trackers:?}");

        Ok(trackers)
    }

    async fn categories(&self) -> Result<Categories, ClientError> {
        debug!("Listing categories");
        let response = self.client.get(CATEGORIES, vec![]).await?;
        decode_json("categories", response)
    }

    async fn create_category(&self, category: &str) -> Result<(), Degraded> {
        debug!("Creating category {category}");
        let response = self
            .client
            .post_form(CREATE_CATEGORY, vec![("category", category.to_string())])
            .await;
        degrade("createCategory", response)
    }

    async fn set_category(&self, hash: &str, category: &str) -> Result<(), Degraded> {
        debug!("Setting category {category} on {hash}");
        let response = self
            .client
            .post_form(
                SET_CATEGORY,
                vec![
                    ("hashes", hash.to_string()),
                    ("category", category.to_string()),
                ],
            )
            .await;
        degrade("setCategory", response)
    }

    async fn set_upload_limit(&self, hash: &str, bytes_per_sec: u64) -> Result<(), Degraded> {
        debug!("Setting upload limit {bytes_per_sec} B/s on {hash}");
        let response = self
            .client
            .post_form(
                SET_UPLOAD_LIMIT,
                vec![
                    ("hashes", hash.to_string()),
                    ("limit", bytes_per_sec.to_string()),
                ],
            )
            .await;
        degrade("setUploadLimit", response)
    }

    async fn remove_tag(&self, hash: &str, tag: &str) -> Result<(), Degraded> {
        debug!("Removing tag {tag} from {hash}");
        let response = self
            .client
            .post_form(
                REMOVE_TAGS,
                vec![("hashes", hash.to_string()), ("tags", tag.to_string())],
            )
            .await;
        degrade("removeTags", response)
    }

    async fn resume(&self, hash: &str) -> Result<(), Degraded> {
        debug!("Resuming {hash}");
        let form = vec![("hashes", hash.to_string())];
        let response = self.client.post_form(RESUME, form.clone()).await;
        if matches!(&response, Ok(r) if r.status == 404) {
            debug!("resume endpoint missing, retrying with start");
            let response = self.client.post_form(START, form).await;
            return degrade("start", response);
        }
        degrade("resume", response)
    }
}
