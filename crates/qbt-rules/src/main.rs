//! # qbt-rules
//!
//! ## Usage
//!
//! ```sh,ignore
//! QBT_USERNAME=admin QBT_PASSWORD=adminadmin qbt-rules --config rules.yaml debian.torrent
//! ```

use std::{io, process::ExitCode};

use clap::Parser;
use regex as _;
use serde_yaml as _;
use thiserror as _;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url as _;
use uuid as _;

#[cfg(test)]
use assert_cmd as _;
#[cfg(test)]
use predicates as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use test_log as _;
#[cfg(test)]
use wiremock as _;

use qbt_rules::{RuleSet, RunContext, RunError, run};
use qbt_rules_controller::QbittorrentClient;
use qbt_rules_types as _;

mod cli;

use cli::Cli;

/// Initializes the tracing subscriber. Logs go to stderr, stdout carries the summary.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn execute(cli: &Cli) -> Result<String, RunError> {
    let context = RunContext {
        rules: RuleSet::load(&cli.config)?,
        settings: cli.settings(),
    };
    debug!("Run settings: {:?}", context.settings);

    let client = QbittorrentClient::try_new(&cli.host, cli.insecure)?;
    let summary = run(&client, &context, &cli.source).await?;
    Ok(summary.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match execute(&cli).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
