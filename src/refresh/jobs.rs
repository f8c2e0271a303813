// Refresh jobs for each cached view.
// Binds a data source and repository to the leaderboard, contributors and stats fetches.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{CONTRIBUTORS_KEY, LEADERBOARD_KEY, STATS_KEY};
use crate::contributors::{ContributorProfile, fetch_contributors};
use crate::error::Result;
use crate::github::{ContributionSource, PageLimits, RepoId};
use crate::scoring::{Contributor, ScoringRules, fetch_leaderboard};
use crate::stats::{RepoStats, fetch_stats};

use super::RefreshJob;

/// Scores merged PRs into the leaderboard.
pub struct LeaderboardJob {
    pub source: Arc<dyn ContributionSource>,
    pub repo: RepoId,
    pub rules: ScoringRules,
    pub limits: PageLimits,
}

#[async_trait]
impl RefreshJob for LeaderboardJob {
    type Output = Vec<Contributor>;

    fn key(&self) -> &'static str {
        LEADERBOARD_KEY
    }

    async fn fetch(&self) -> Result<Vec<Contributor>> {
        fetch_leaderboard(self.source.as_ref(), &self.repo, &self.rules, self.limits).await
    }
}

/// Loads enriched contributor profiles.
pub struct ContributorsJob {
    pub source: Arc<dyn ContributionSource>,
    pub repo: RepoId,
    pub lead: Option<String>,
    pub limits: PageLimits,
    pub concurrency: usize,
}

#[async_trait]
impl RefreshJob for ContributorsJob {
    type Output = Vec<ContributorProfile>;

    fn key(&self) -> &'static str {
        CONTRIBUTORS_KEY
    }

    async fn fetch(&self) -> Result<Vec<ContributorProfile>> {
        fetch_contributors(
            self.source.as_ref(),
            &self.repo,
            self.lead.as_deref(),
            self.limits,
            self.concurrency,
        )
        .await
    }
}

/// Loads repository stats.
pub struct StatsJob {
    pub source: Arc<dyn ContributionSource>,
    pub repo: RepoId,
}

#[async_trait]
impl RefreshJob for StatsJob {
    type Output = RepoStats;

    fn key(&self) -> &'static str {
        STATS_KEY
    }

    async fn fetch(&self) -> Result<RepoStats> {
        fetch_stats(self.source.as_ref(), &self.repo).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::CacheService;
    use crate::cache::clock::ManualClock;
    use crate::cache::store::MemoryStorage;
    use crate::github::source::fake::{FakeSource, pull};
    use crate::refresh::{OpenOutcome, RefreshOutcome, Revalidator};
    use crate::state::{LeaderboardView, RankBadge};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn leaderboard(
        source: Arc<FakeSource>,
        now: i64,
    ) -> (Arc<Revalidator<LeaderboardJob>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(now));
        let cache = CacheService::new(Arc::new(MemoryStorage::new()), clock.clone());
        let job = LeaderboardJob {
            source,
            repo: RepoId::new("SandeepVashishtha", "Eventra"),
            rules: ScoringRules::default(),
            limits: PageLimits::default(),
        };
        (Arc::new(Revalidator::new(job, cache, HOUR)), clock)
    }

    #[tokio::test]
    async fn test_alice_scenario_end_to_end() {
        let source = Arc::new(FakeSource::with_pulls(vec![pull(
            1,
            "alice",
            &["gssoc", "level-2"],
            true,
        )]));
        let (revalidator, _) = leaderboard(source, 1_000);

        let outcome = revalidator.open().await;
        assert!(matches!(outcome, OpenOutcome::Fetched(RefreshOutcome::Updated { .. })));

        let snapshot = revalidator.snapshot().unwrap();
        assert_eq!(snapshot.data.len(), 1);
        assert_eq!(snapshot.data[0].username, "alice");
        assert_eq!(snapshot.data[0].points, 7);
        assert_eq!(snapshot.data[0].prs, 1);

        let mut view = LeaderboardView::default();
        view.set_contributors(snapshot.data);
        let rows = view.visible();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].badge, RankBadge::Gold);
        assert_eq!(rows[0].contributor.username, "alice");
        assert_eq!(view.rank_of("alice"), Some(1));
    }

    #[tokio::test]
    async fn test_rate_limited_refresh_keeps_board() {
        let source = Arc::new(FakeSource::with_pulls(vec![pull(
            1,
            "alice",
            &["gssoc", "level-2"],
            true,
        )]));
        let (revalidator, clock) = leaderboard(source.clone(), 1_000);
        revalidator.refresh().await;
        let before = revalidator.snapshot().unwrap();

        // API now answers with no pull requests at all
        source.set_pulls(Vec::new());
        clock.advance(3 * 60 * 60 * 1000);
        assert_eq!(revalidator.refresh().await, RefreshOutcome::Empty);

        assert_eq!(revalidator.snapshot().unwrap(), before);
        assert_eq!(revalidator.snapshot().unwrap().timestamp, 1_000);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_board() {
        let source = Arc::new(FakeSource::with_pulls(vec![pull(
            1,
            "alice",
            &["gssoc", "level-1"],
            true,
        )]));
        let (revalidator, _) = leaderboard(source.clone(), 1_000);
        revalidator.refresh().await;

        source.set_failing(true);
        assert!(matches!(revalidator.refresh().await, RefreshOutcome::Failed(_)));
        assert_eq!(revalidator.snapshot().unwrap().data[0].points, 3);
    }
}
