//! # Torrent controller using the qBittorrent WebUI API.
//!
//! usage:
//!
//! ```rust,ignore
//! use qbt_rules_controller::QbittorrentClient;
//! use qbt_rules_types::{AddSource, TorrentClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QbittorrentClient::try_new("http://localhost:8080", false)?;
//!     client.login(Some("admin"), Some("adminadmin")).await?;
//!     let source = AddSource::Magnet("magnet:?xt=urn:btih:...".into());
//!     client.add(&source, "my-tag", true).await?;
//!     let torrents = client.torrents_by_tag("my-tag").await?;
//!     println!("Added torrent: {:?}", torrents.first());
//!     Ok(())
//! }
//! ```

mod client;
mod conversions;
mod ops;
#[cfg(test)]
mod testutil;

#[cfg(test)]
use tracing_subscriber as _;
#[cfg(test)]
use wiremock as _;

pub use client::QbittorrentClient;
pub use ops::WebUi;
