// Stale-while-revalidate refresh service.
// Serves cached snapshots immediately and refreshes them in the background.

pub mod jobs;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEnvelope, CachePayload, CacheService};
use crate::error::Result;

pub use jobs::{ContributorsJob, LeaderboardJob, StatsJob};

/// A fetch whose result is cached under a single storage key.
#[async_trait]
pub trait RefreshJob: Send + Sync + 'static {
    type Output: Serialize + DeserializeOwned + CachePayload + Clone + Send + Sync + 'static;

    /// Storage key for the cached result.
    fn key(&self) -> &'static str;

    /// Fetch a complete snapshot.
    async fn fetch(&self) -> Result<Self::Output>;
}

/// Where a cached snapshot sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
    Refreshing,
}

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshot committed with this timestamp.
    Updated { timestamp: i64 },
    /// Fetch succeeded but returned nothing; previous snapshot kept.
    Empty,
    /// Fetch failed; previous snapshot kept.
    Failed(String),
    /// Another refresh for this key was already running.
    Skipped,
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }
}

/// What `open` did besides serving the cache.
#[derive(Debug)]
pub enum OpenOutcome {
    /// Cached snapshot is within max age.
    Fresh,
    /// Cached snapshot served; a background refresh is running.
    Revalidating(JoinHandle<RefreshOutcome>),
    /// No cache; a foreground fetch ran.
    Fetched(RefreshOutcome),
}

#[derive(Debug)]
struct Inner<T> {
    snapshot: Option<CacheEnvelope<T>>,
    refreshing: bool,
    last_error: Option<String>,
}

/// Clears the refreshing flag when a refresh ends, even by panic.
struct RefreshingGuard<'a, T> {
    inner: &'a Mutex<Inner<T>>,
}

impl<T> Drop for RefreshingGuard<'_, T> {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshing = false;
    }
}

/// Stale-while-revalidate driver for one refresh job.
pub struct Revalidator<J: RefreshJob> {
    job: J,
    cache: CacheService,
    max_age: Duration,
    inner: Mutex<Inner<J::Output>>,
}

impl<J: RefreshJob> Revalidator<J> {
    pub fn new(job: J, cache: CacheService, max_age: Duration) -> Self {
        Self {
            job,
            cache,
            max_age,
            inner: Mutex::new(Inner {
                snapshot: None,
                refreshing: false,
                last_error: None,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner<J::Output>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> &'static str {
        self.job.key()
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self) -> Option<CacheEnvelope<J::Output>> {
        self.inner().snapshot.clone()
    }

    /// Message from the last failed refresh, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.inner().last_error.clone()
    }

    pub fn state(&self) -> CacheState {
        let inner = self.inner();
        if inner.refreshing {
            return CacheState::Refreshing;
        }
        match &inner.snapshot {
            None => CacheState::Empty,
            Some(envelope) if self.cache.is_stale(envelope, self.max_age) => CacheState::Stale,
            Some(_) => CacheState::Fresh,
        }
    }

    /// Load the persisted snapshot into memory, keeping the in-memory one if
    /// storage has nothing.
    pub fn load(&self) -> Option<CacheEnvelope<J::Output>> {
        let stored = self.cache.read::<J::Output>(self.job.key());
        let mut inner = self.inner();
        if let Some(envelope) = stored {
            inner.snapshot = Some(envelope);
        }
        inner.snapshot.clone()
    }

    /// Fetch and commit a new snapshot. Never fails: problems are logged and
    /// leave the current snapshot untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        {
            let mut inner = self.inner();
            if inner.refreshing {
                debug!(key = self.key(), "refresh already running");
                return RefreshOutcome::Skipped;
            }
            inner.refreshing = true;
        }
        let _guard = RefreshingGuard { inner: &self.inner };

        let outcome = match self.job.fetch().await {
            Ok(data) if data.is_empty_payload() => {
                warn!(key = self.key(), "refresh returned no data, keeping previous snapshot");
                RefreshOutcome::Empty
            }
            Ok(data) => self.commit(data),
            Err(e) => {
                if e.is_transient() {
                    warn!(key = self.key(), error = %e, "refresh failed, keeping previous snapshot");
                } else {
                    error!(key = self.key(), error = %e, "refresh failed, keeping previous snapshot");
                }
                RefreshOutcome::Failed(e.to_string())
            }
        };

        {
            let mut inner = self.inner();
            match &outcome {
                RefreshOutcome::Updated { .. } => inner.last_error = None,
                RefreshOutcome::Failed(message) => inner.last_error = Some(message.clone()),
                RefreshOutcome::Empty => {
                    inner.last_error = Some("refresh returned no data".to_string())
                }
                RefreshOutcome::Skipped => {}
            }
        }
        outcome
    }

    fn commit(&self, data: J::Output) -> RefreshOutcome {
        let timestamp = match self.cache.write(self.key(), &data) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                // Still show what we fetched; it just won't survive a restart
                warn!(key = self.key(), error = %e, "failed to persist snapshot");
                self.cache.now_millis()
            }
        };
        info!(key = self.key(), timestamp, "snapshot updated");
        self.inner().snapshot = Some(CacheEnvelope { data, timestamp });
        RefreshOutcome::Updated { timestamp }
    }

    /// Serve the cache, revalidating as needed.
    ///
    /// With a cached snapshot this returns at once and spawns a background
    /// refresh only when the snapshot is stale. Without one it waits for a
    /// foreground fetch.
    pub async fn open(self: &Arc<Self>) -> OpenOutcome {
        match self.load() {
            Some(envelope) if self.cache.is_stale(&envelope, self.max_age) => {
                debug!(key = self.key(), "serving stale snapshot, revalidating");
                OpenOutcome::Revalidating(self.spawn_refresh())
            }
            Some(_) => OpenOutcome::Fresh,
            None => OpenOutcome::Fetched(self.refresh().await),
        }
    }

    /// Run a refresh on the runtime without waiting for it.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<RefreshOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.refresh().await })
    }

    /// Refresh every `max_age` until the returned task is aborted.
    pub fn spawn_periodic(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.max_age);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let outcome = this.refresh().await;
                debug!(key = this.key(), ?outcome, "periodic refresh");
            }
        })
    }
}
