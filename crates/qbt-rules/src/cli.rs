use std::{path::PathBuf, time::Duration};

use clap::Parser;

use qbt_rules::RunSettings;

/// Add a torrent to qBittorrent and apply tracker-based rules.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Path to a .torrent file or a magnet URI.
    pub source: String,

    /// Base URL of the qBittorrent WebUI.
    #[arg(long, env = "QBT_HOST", default_value = "http://localhost:8080")]
    pub host: String,

    /// WebUI username.
    #[arg(long, env = "QBT_USERNAME")]
    pub username: Option<String>,

    /// WebUI password.
    #[arg(long, env = "QBT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to the YAML rules file.
    #[arg(long, env = "QBT_RULES_FILE", default_value = "rules.yaml")]
    pub config: PathBuf,

    /// Skip TLS certificate verification.
    #[arg(long, default_value_t = false)]
    pub insecure: bool,

    /// Leave the torrent paused once the rules are applied.
    #[arg(long, default_value_t = false)]
    pub no_unpause: bool,

    /// Seconds to wait for the added torrent to show up.
    #[arg(long, env = "QBT_TIMEOUT", default_value_t = 20)]
    pub timeout: u64,
}

impl Cli {
    /// Run settings derived from the arguments.
    pub(crate) fn settings(&self) -> RunSettings {
        RunSettings {
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout),
            auto_resume: !self.no_unpause,
            ..Default::default()
        }
    }
}
