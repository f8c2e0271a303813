// Service wiring.
// Builds the GitHub client, the cache, and one revalidator per cached view.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cache::{CacheService, FileStorage, SystemClock};
use crate::config::Config;
use crate::error::{BoardError, Result};
use crate::github::{ContributionSource, GitHubClient, RateLimit};
use crate::refresh::{ContributorsJob, LeaderboardJob, Revalidator, StatsJob};

/// Everything the commands and the TUI need, built once from config.
pub struct Board {
    client: Option<Arc<GitHubClient>>,
    pub leaderboard: Arc<Revalidator<LeaderboardJob>>,
    pub contributors: Arc<Revalidator<ContributorsJob>>,
    pub stats: Arc<Revalidator<StatsJob>>,
}

impl Board {
    /// Build against the live GitHub API with file-backed storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(GitHubClient::new(
            config.github.token.as_deref(),
            &config.github.api_base,
            config.timeout(),
        )?);
        let dir: PathBuf = config
            .cache_dir()
            .ok_or_else(|| BoardError::Other("could not determine cache directory".to_string()))?;
        let cache = CacheService::new(Arc::new(FileStorage::new(dir)), Arc::new(SystemClock));

        let mut board = Self::with_source(config, client.clone(), cache);
        board.client = Some(client);
        Ok(board)
    }

    /// Build against any data source and cache.
    pub fn with_source(
        config: &Config,
        source: Arc<dyn ContributionSource>,
        cache: CacheService,
    ) -> Self {
        let repo = config.repo();
        let limits = config.page_limits();

        let leaderboard = LeaderboardJob {
            source: source.clone(),
            repo: repo.clone(),
            rules: config.leaderboard.rules(),
            limits,
        };
        let contributors = ContributorsJob {
            source: source.clone(),
            repo: repo.clone(),
            lead: Some(config.lead()),
            limits,
            concurrency: config.contributors.profile_concurrency.max(1),
        };
        let stats = StatsJob { source, repo };

        Self {
            client: None,
            leaderboard: Arc::new(Revalidator::new(
                leaderboard,
                cache.clone(),
                config.leaderboard_max_age(),
            )),
            contributors: Arc::new(Revalidator::new(
                contributors,
                cache.clone(),
                config.contributors_max_age(),
            )),
            stats: Arc::new(Revalidator::new(stats, cache, config.stats_max_age())),
        }
    }

    /// Rate limit from the most recent API response, when talking to GitHub.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.client.as_ref().map(|client| client.rate_limit())
    }

    /// Start one periodic refresh task per view.
    pub fn spawn_periodic(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.leaderboard.spawn_periodic(),
            self.contributors.spawn_periodic(),
            self.stats.spawn_periodic(),
        ]
    }
}
