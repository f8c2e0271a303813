// Cache module for local snapshot storage.
// Envelopes, storage backends, and the injected clock behind staleness checks.

pub mod clock;
pub mod paths;
pub mod service;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use paths::{CONTRIBUTORS_KEY, LEADERBOARD_KEY, STATS_KEY, cache_dir, log_path};
pub use service::{CacheEnvelope, CachePayload, CacheService};
pub use store::{FileStorage, Storage};
