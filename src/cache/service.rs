// Cache service over an injected storage backend and clock.
// Reads and writes `{data, timestamp}` envelopes and answers staleness questions.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::Result;

use super::{Clock, Storage};

/// Wrapper for cached data with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, epoch milliseconds.
    pub timestamp: i64,
}

impl<T> CacheEnvelope<T> {
    /// Milliseconds between `timestamp` and `now`.
    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Stale once strictly older than `max_age`.
    pub fn is_stale(&self, now: i64, max_age: Duration) -> bool {
        let max_age = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now) > max_age
    }
}

/// Payloads that can be empty. An empty payload is never cached or served.
pub trait CachePayload {
    fn is_empty_payload(&self) -> bool;
}

impl<T> CachePayload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// Explicitly constructed cache: storage plus clock.
#[derive(Clone)]
pub struct CacheService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl CacheService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Read the envelope for `key`.
    ///
    /// Missing, unreadable, unparsable and empty entries all read as absent.
    pub fn read<T>(&self, key: &str) -> Option<CacheEnvelope<T>>
    where
        T: DeserializeOwned + CachePayload,
    {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str::<CacheEnvelope<T>>(&raw) {
            Ok(envelope) if envelope.data.is_empty_payload() => None,
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(key, error = %e, "ignoring unparsable cache entry");
                None
            }
        }
    }

    /// Write `data` under `key` stamped with the current time.
    /// Returns the timestamp that was stored.
    pub fn write<T>(&self, key: &str, data: &T) -> Result<i64>
    where
        T: Serialize,
    {
        let timestamp = self.clock.now_millis();
        let json = serde_json::to_string(&CacheEnvelope { data, timestamp })?;
        self.storage.set(key, &json)?;
        Ok(timestamp)
    }

    /// Whether `envelope` is older than `max_age` right now.
    pub fn is_stale<T>(&self, envelope: &CacheEnvelope<T>, max_age: Duration) -> bool {
        envelope.is_stale(self.clock.now_millis(), max_age)
    }
}
