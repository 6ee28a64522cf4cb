//! Shared test utilities and fixtures.

use std::cell::{Cell, RefCell};

use qbt_rules_types::{
    AddSource, Categories, Category, ClientError, Degraded, TorrentClient, TorrentEntry, Tracker,
};

pub(crate) const HASH: &str = "8c4adbf9ebe66f1d804fb6a4fb9b74966c3ab609";
pub(crate) const TAG: &str = "qbt-rules-test";

/// In-memory client that records every call in order.
pub(crate) struct FakeClient {
    calls: RefCell<Vec<String>>,
    /// Lookups answering empty before the torrent shows up, `None` never shows it.
    empty_polls: Option<usize>,
    polls: Cell<usize>,
    /// Every lookup also lists an entry that has no hash yet, ahead of the real one.
    hashless: bool,
    trackers: Vec<Tracker>,
    categories: Categories,
    failing: Vec<&'static str>,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            empty_polls: Some(0),
            polls: Cell::new(0),
            hashless: false,
            trackers: Vec::new(),
            categories: Categories::new(),
            failing: Vec::new(),
        }
    }

    pub(crate) fn with_trackers(mut self, urls: &[&str]) -> Self {
        self.trackers = urls
            .iter()
            .map(|url| Tracker {
                url: url.to_string(),
            })
            .collect();
        self
    }

    pub(crate) fn with_category(mut self, name: &str) -> Self {
        self.categories.insert(
            name.to_string(),
            Category {
                name: name.to_string(),
                save_path: String::new(),
            },
        );
        self
    }

    pub(crate) fn registering_after(mut self, empty_polls: usize) -> Self {
        self.empty_polls = Some(empty_polls);
        self
    }

    pub(crate) fn with_hashless_entry(mut self) -> Self {
        self.hashless = true;
        self
    }

    pub(crate) fn never_registering(mut self) -> Self {
        self.empty_polls = None;
        self
    }

    /// Makes the named call fail (`login`, `add`, `info`, `setCategory`, ...).
    pub(crate) fn failing(mut self, call: &'static str) -> Self {
        self.failing.push(call);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(call))
            .count()
    }

    fn record(&self, call: &'static str, detail: String) -> Result<(), ClientError> {
        let entry = if detail.is_empty() {
            call.to_string()
        } else {
            format!("{call} {detail}")
        };
        self.calls.borrow_mut().push(entry);
        if self.failing.contains(&call) {
            return Err(ClientError::ServerError {
                call,
                status: 500,
                body: "Internal Server Error".into(),
            });
        }
        Ok(())
    }

    fn record_soft(&self, call: &'static str, detail: String) -> Result<(), Degraded> {
        self.record(call, detail).map_err(|e| Degraded::new(call, e))
    }
}

impl TorrentClient for FakeClient {
    async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), ClientError> {
        if username.is_none() || password.is_none() {
            return Err(ClientError::MissingCredentials);
        }
        self.record("login", String::new()).map_err(|_| ClientError::LoginRejected {
            status: 200,
            body: "Fails.".into(),
        })
    }

    async fn add(&self, source: &AddSource, tag: &str, paused: bool) -> Result<(), ClientError> {
        let kind = match source {
            AddSource::Magnet(_) => "magnet",
            AddSource::TorrentFile { .. } => "file",
        };
        self.record("add", format!("{kind} {tag} paused={paused}"))
    }

    async fn torrents_by_tag(&self, tag: &str) -> Result<Vec<TorrentEntry>, ClientError> {
        self.record("info", tag.to_string())?;
        let polls = self.polls.get();
        self.polls.set(polls + 1);
        let mut listing = Vec::new();
        if self.hashless {
            listing.push(TorrentEntry {
                hash: String::new(),
                name: "fetching metadata".to_string(),
            });
        }
        if self.empty_polls.is_some_and(|empty| polls >= empty) {
            listing.push(TorrentEntry {
                hash: HASH.to_string(),
                name: "debian-12.iso".to_string(),
            });
        }
        Ok(listing)
    }

    async fn trackers(&self, hash: &str) -> Result<Vec<Tracker>, ClientError> {
        self.record("trackers", hash.to_string())?;
        Ok(self.trackers.clone())
    }

    async fn categories(&self) -> Result<Categories, ClientError> {
        self.record("categories", String::new())?;
        Ok(self.categories.clone())
    }

    async fn create_category(&self, category: &str) -> Result<(), Degraded> {
        self.record_soft("createCategory", category.to_string())
    }

    async fn set_category(&self, hash: &str, category: &str) -> Result<(), Degraded> {
        self.record_soft("setCategory", format!("{hash} {category}"))
    }

    async fn set_upload_limit(&self, hash: &str, bytes_per_sec: u64) -> Result<(), Degraded> {
        self.record_soft("setUploadLimit", format!("{hash} {bytes_per_sec}"))
    }

    async fn remove_tag(&self, hash: &str, tag: &str) -> Result<(), Degraded> {
        self.record_soft("removeTags", format!("{hash} {tag}"))
    }

    async fn resume(&self, hash: &str) -> Result<(), Degraded> {
        self.record_soft("resume", hash.to_string())
    }
}
