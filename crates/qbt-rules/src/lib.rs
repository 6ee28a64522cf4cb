//! # qbt-rules
//!
//! Adds a torrent to qBittorrent and applies the category and upload limit of the first rule
//! matching one of its tracker hostnames.
//!
//! ## Example
//!
//! ```rust,ignore
//! use qbt_rules::{RuleSet, RunContext, RunSettings, run};
//! use qbt_rules_controller::QbittorrentClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = RunContext {
//!         rules: RuleSet::load("rules.yaml")?,
//!         settings: RunSettings {
//!             username: Some("admin".into()),
//!             password: Some("adminadmin".into()),
//!             ..Default::default()
//!         },
//!     };
//!     let client = QbittorrentClient::try_new("http://localhost:8080", false)?;
//!     let summary = run(&client, &context, "debian.torrent").await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

use clap as _;
use dotenvy as _;
use qbt_rules_controller as _;
use tracing_subscriber as _;

#[cfg(test)]
use assert_cmd as _;
#[cfg(test)]
use predicates as _;
#[cfg(test)]
use wiremock as _;

pub mod error;
pub mod hosts;
pub mod matcher;
pub mod orchestrator;
pub mod rules;

#[cfg(test)]
mod testutil;

pub use error::{RulesError, RunError};
pub use hosts::{normalize_hostname, tracker_hostnames};
pub use matcher::{Decision, kib_to_bytes, match_rules};
pub use orchestrator::{RunContext, RunSettings, RunSummary, read_source, run};
pub use rules::{Defaults, HostPattern, Rule, RuleSet};
