//! Internal trait abstracting the WebUI HTTP transport.
//!
//! This module provides the [`WebUiOps`] trait which abstracts the underlying
//! HTTP session, enabling mocking in tests, and [`WebUi`], the `reqwest` implementation.

use reqwest::{
    Client,
    multipart::{Form, Part},
};
use tracing::debug;
use url::Url;

use qbt_rules_types::ClientError;

use crate::conversions::map_reqwest_error;

/// Form or query fields of a single request.
pub(crate) type Fields = Vec<(&'static str, String)>;

/// Status and body of a WebUI response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Internal trait that abstracts the WebUI transport operations.
/// This allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub(crate) trait WebUiOps {
    async fn get(&self, endpoint: &str, query: Fields) -> Result<ApiResponse, ClientError>;
    async fn post_form(&self, endpoint: &str, form: Fields) -> Result<ApiResponse, ClientError>;
    async fn post_torrent_file(
        &self,
        endpoint: &str,
        form: Fields,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<ApiResponse, ClientError>;
}

/// HTTP session against a qBittorrent WebUI.
///
/// The session keeps the `SID` cookie handed out by the login endpoint.
#[derive(Debug)]
pub struct WebUi {
    http: Client,
    base_url: Url,
}

impl WebUi {
    /// Builds a session rooted at `base_url`. TLS certificate checks are skipped when `insecure`.
    pub fn try_new(base_url: &str, insecure: bool) -> Result<Self, ClientError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url}: not a base URL"
            )));
        }
        // Endpoints are joined relative to the base so a reverse-proxy prefix is kept.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, endpoint: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| ClientError::InvalidUrl(format!("{endpoint}: {e}")))
    }

    async fn finish(response: reqwest::Response) -> Result<ApiResponse, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        debug!("Response status {status}, {} bytes", body.len());
        Ok(ApiResponse { status, body })
    }
}

impl WebUiOps for WebUi {
    async fn get(&self, endpoint: &str, query: Fields) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint(endpoint)?;
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::finish(response).await
    }

    async fn post_form(&self, endpoint: &str, form: Fields) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint(endpoint)?;
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::finish(response).await
    }

    async fn post_torrent_file(
        &self,
        endpoint: &str,
        form: Fields,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint(endpoint)?;
        debug!("POST {url} (multipart, {file_name})");
        let part = Part::bytes(contents)
            .file_name(file_name)
            .mime_str("application/x-bittorrent")
            .map_err(map_reqwest_error)?;
        let multipart = form
            .into_iter()
            .fold(Form::new(), |multipart, (name, value)| {
                multipart.text(name, value)
            })
            .part("torrents", part);

        let response = self
            .http
            .post(url)
            .multipart(multipart)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::finish(response).await
    }
}
