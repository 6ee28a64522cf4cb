//! End-to-end sequence of a run: add the torrent, find it again, and apply the matched rule.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use qbt_rules_types::{AddSource, Degraded, TorrentClient, TorrentEntry};

use crate::{
    error::RunError,
    hosts::tracker_hostnames,
    matcher::{Decision, kib_to_bytes, match_rules},
    rules::RuleSet,
};

/// Delay between two lookups of the added torrent.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default time to wait for the added torrent to show up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Prefix of the per-run marker tag.
pub const MARKER_TAG_PREFIX: &str = "qbt-rules-";

/// Per-run settings.
#[derive(Clone)]
pub struct RunSettings {
    /// WebUI username.
    pub username: Option<String>,
    /// WebUI password.
    pub password: Option<String>,
    /// How long to wait for the added torrent to register.
    pub timeout: Duration,
    /// Delay between registration lookups.
    pub poll_interval: Duration,
    /// Resume the torrent once the rules are applied.
    pub auto_resume: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            auto_resume: true,
        }
    }
}

impl fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("auto_resume", &self.auto_resume)
            .finish()
    }
}

/// Everything a run needs besides the client: the rule set and the run settings.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Rules loaded at startup.
    pub rules: RuleSet,
    /// Settings of this run.
    pub settings: RunSettings,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Hash of the added torrent.
    pub hash: String,
    /// Tracker hostnames that were observed.
    pub hosts: Vec<String>,
    /// Settings chosen by the rules.
    pub decision: Decision,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hosts = if self.hosts.is_empty() {
            "none".to_string()
        } else {
            self.hosts.join(", ")
        };
        write!(f, "Applied: {}. Hosts: {hosts}", self.decision)
    }
}

/// Generates a marker tag no other run or torrent will carry.
pub fn marker_tag() -> String {
    format!("{MARKER_TAG_PREFIX}{}", Uuid::new_v4())
}

/// Runs the whole sequence for `source` (a `.torrent` path or a magnet URI).
pub async fn run<C: TorrentClient>(
    client: &C,
    context: &RunContext,
    source: &str,
) -> Result<RunSummary, RunError> {
    Run::new(client, context, marker_tag()).execute(source).await
}

/// A single pass through the state machine, bound to one marker tag.
#[derive(Debug)]
pub struct Run<'a, C> {
    client: &'a C,
    context: &'a RunContext,
    tag: String,
}

impl<'a, C: TorrentClient> Run<'a, C> {
    /// Prepares a run that marks the added torrent with `tag`.
    pub fn new(client: &'a C, context: &'a RunContext, tag: String) -> Self {
        Self {
            client,
            context,
            tag,
        }
    }

    /// Executes every step in order. Fatal failures stop the sequence, best-effort ones are
    /// logged.
    #[instrument(skip(self), fields(tag = %self.tag))]
    pub async fn execute(&self, source: &str) -> Result<RunSummary, RunError> {
        let settings = &self.context.settings;
        self.client
            .login(settings.username.as_deref(), settings.password.as_deref())
            .await?;

        let source = read_source(source).await?;
        self.client.add(&source, &self.tag, true).await?;

        let torrent = self.await_registration().await?;
        let hash = torrent.hash;
        info!("Torrent {} registered as {hash}", torrent.name);

        let trackers = self.client.trackers(&hash).await?;
        let hosts = tracker_hostnames(&trackers);
        debug!("Tracker hosts: {hosts:?}");

        let decision = match_rules(&hosts, &self.context.rules);
        self.apply(&hash, &decision).await?;

        if let Err(degraded) = self.client.remove_tag(&hash, &self.tag).await {
            debug!(call = degraded.call, "Marker tag left in place: {degraded}");
        }

        if settings.auto_resume
            && let Err(degraded) = self.client.resume(&hash).await
        {
            log_degraded(&degraded);
        }

        Ok(RunSummary {
            hash,
            hosts,
            decision,
        })
    }

    /// Polls for the torrent carrying the marker tag until it shows up or the timeout elapses.
    ///
    /// A timeout too large to be represented as an instant never elapses.
    async fn await_registration(&self) -> Result<TorrentEntry, RunError> {
        let settings = &self.context.settings;
        let deadline = Instant::now().checked_add(settings.timeout);

        while deadline.is_none_or(|deadline| Instant::now() < deadline) {
            let torrents = self.client.torrents_by_tag(&self.tag).await?;
            // Entries without a hash cannot be acted upon.
            if let Some(torrent) = torrents.into_iter().find(|t| !t.hash.is_empty()) {
                return Ok(torrent);
            }
            sleep(settings.poll_interval).await;
        }

        Err(RunError::RegistrationTimeout(settings.timeout))
    }

    async fn apply(&self, hash: &str, decision: &Decision) -> Result<(), RunError> {
        if let Some(category) = &decision.category {
            let categories = self.client.categories().await?;
            if !categories.contains_key(category)
                && let Err(degraded) = self.client.create_category(category).await
            {
                log_degraded(&degraded);
            }
            if let Err(degraded) = self.client.set_category(hash, category).await {
                log_degraded(&degraded);
            }
        }

        if let Some(kib) = decision.up_limit_kib {
            let bytes = kib_to_bytes(kib);
            if let Err(degraded) = self.client.set_upload_limit(hash, bytes).await {
                log_degraded(&degraded);
            }
        }

        Ok(())
    }
}

fn log_degraded(degraded: &Degraded) {
    warn!(call = degraded.call, "{degraded}");
}

/// Resolves the command line source to something the client can submit.
pub async fn read_source(source: &str) -> Result<AddSource, RunError> {
    if AddSource::is_magnet(source) {
        return Ok(AddSource::Magnet(source.to_string()));
    }

    let path = Path::new(source);
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(RunError::SourceNotFound(PathBuf::from(source)));
    }

    let contents = tokio::fs::read(path)
        .await
        .map_err(|source| RunError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source.torrent".to_string());

    Ok(AddSource::TorrentFile {
        file_name,
        contents,
    })
}
