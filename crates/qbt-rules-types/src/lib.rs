//! # qbt-rules types
//!
//! This crate defines the common types and the client trait shared by the qBittorrent controller
//! and the rules orchestrator.

use std::{collections::BTreeMap, fmt};

use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
use serde_json as _;

/// Error type for remote control operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Username or password was not supplied, no request was sent.
    #[error(
        "missing username/password, provide --username/--password or env QBT_USERNAME/QBT_PASSWORD"
    )]
    MissingCredentials,

    /// The WebUI refused the supplied credentials.
    #[error("login failed (status {status}): {body}")]
    LoginRejected {
        /// HTTP status returned by the login endpoint.
        status: u16,
        /// Response body, `Fails.` for bad credentials.
        body: String,
    },

    /// The session is not (or no longer) authenticated.
    #[error("authentication required")]
    Unauthorized,

    /// Server returned a non-success response.
    #[error("{call} failed (status {status}): {body}")]
    ServerError {
        /// Name of the API call that failed.
        call: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Network-related errors (connection failures, timeouts, TLS, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// A response body could not be decoded.
    #[error("invalid response from {call}: {message}")]
    Decode {
        /// Name of the API call whose response was malformed.
        call: &'static str,
        /// Decoder message.
        message: String,
    },

    /// The WebUI base URL is not usable.
    #[error("invalid WebUI URL: {0}")]
    InvalidUrl(String),
}

/// Failure of a best-effort call.
///
/// Best-effort calls never abort a run: the caller logs the failure and carries on with the
/// torrent already added.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct Degraded {
    /// Name of the API call that failed.
    pub call: &'static str,
    /// The underlying error.
    #[source]
    pub source: ClientError,
}

impl Degraded {
    /// Wraps `source` as the degraded outcome of `call`.
    pub fn new(call: &'static str, source: ClientError) -> Self {
        Self { call, source }
    }
}

/// Source of a torrent to submit.
#[derive(Clone, PartialEq, Eq)]
pub enum AddSource {
    /// A `magnet:?` URI, submitted as a URL.
    Magnet(String),
    /// The contents of a `.torrent` file, submitted as a multipart upload.
    TorrentFile {
        /// File name reported in the upload.
        file_name: String,
        /// Raw metainfo bytes.
        contents: Vec<u8>,
    },
}

impl AddSource {
    /// Returns true if `source` should be submitted as a magnet URI rather than read from disk.
    pub fn is_magnet(source: &str) -> bool {
        source.starts_with("magnet:?")
    }
}

impl fmt::Debug for AddSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Magnet(uri) => f.debug_tuple("Magnet").field(uri).finish(),
            Self::TorrentFile {
                file_name,
                contents,
            } => f
                .debug_struct("TorrentFile")
                .field("file_name", file_name)
                .field("len", &contents.len())
                .finish(),
        }
    }
}

/// Remote control interface of a BitTorrent client.
///
/// Calls returning [`ClientError`] are fatal for a run. Calls returning [`Degraded`] are
/// best-effort.
#[allow(async_fn_in_trait)]
pub trait TorrentClient {
    /// Authenticate the session. Fails with [`ClientError::MissingCredentials`] before any
    /// request when either credential is absent or empty.
    async fn login(&self, username: Option<&str>, password: Option<&str>)
    -> Result<(), ClientError>;
    /// Submit a torrent, tagged with `tag`. When `paused` is true it is added stopped.
    async fn add(&self, source: &AddSource, tag: &str, paused: bool) -> Result<(), ClientError>;
    /// List torrents carrying `tag`.
    async fn torrents_by_tag(&self, tag: &str) -> Result<Vec<TorrentEntry>, ClientError>;
    /// List the trackers of the torrent identified by `hash`.
    async fn trackers(&self, hash: &str) -> Result<Vec<Tracker>, ClientError>;
    /// List all categories known to the client.
    async fn categories(&self) -> Result<Categories, ClientError>;
    /// Create a category.
    async fn create_category(&self, category: &str) -> Result<(), Degraded>;
    /// Assign `category` to the torrent.
    async fn set_category(&self, hash: &str, category: &str) -> Result<(), Degraded>;
    /// Set the torrent upload limit in bytes per second, 0 means unlimited.
    async fn set_upload_limit(&self, hash: &str, bytes_per_sec: u64) -> Result<(), Degraded>;
    /// Remove `tag` from the torrent.
    async fn remove_tag(&self, hash: &str, tag: &str) -> Result<(), Degraded>;
    /// Resume (start) the torrent.
    async fn resume(&self, hash: &str) -> Result<(), Degraded>;
}

// The below mirror the qBittorrent WebUI JSON records, only the fields in use are kept.

/// Torrent listing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TorrentEntry {
    /// Info hash, the handle for every per-torrent call.
    #[serde(default)]
    pub hash: String,

    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Tracker entry of a torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tracker {
    /// Announce URL. Pseudo-entries such as `** [DHT] **` are not URLs.
    #[serde(default)]
    pub url: String,
}

/// Category record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Category name.
    #[serde(default)]
    pub name: String,

    /// Save path, empty when the default is used.
    #[serde(default, rename = "savePath")]
    pub save_path: String,
}

/// Categories keyed by name.
pub type Categories = BTreeMap<String, Category>;
