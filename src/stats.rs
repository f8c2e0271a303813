// Repository statistics.
// One required repository lookup plus best-effort contributor and open PR counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::CachePayload;
use crate::error::Result;
use crate::github::{ContributionSource, MAX_PER_PAGE, RepoId};

/// Snapshot of repository-level numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub full_name: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
    /// Contributors on the first page; `None` when the lookup failed.
    pub contributors: Option<usize>,
    /// Open PRs on the first page; `None` when the lookup failed.
    pub open_pull_requests: Option<usize>,
    pub license: Option<String>,
    pub last_push: Option<DateTime<Utc>>,
    /// Size in kilobytes as reported by GitHub.
    pub size_kb: u64,
}

impl CachePayload for RepoStats {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

impl RepoStats {
    /// Code size in megabytes with one decimal.
    pub fn size_mb(&self) -> String {
        format!("{:.1} MB", self.size_kb as f64 / 1024.0)
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let count = |value: Option<usize>| {
            value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "—".to_string())
        };
        vec![
            ("Stars", self.stars.to_string()),
            ("Forks", self.forks.to_string()),
            ("Issues", self.open_issues.to_string()),
            ("Pull Requests", count(self.open_pull_requests)),
            ("Contributors", count(self.contributors)),
            ("Watchers", self.watchers.to_string()),
            (
                "License",
                self.license.clone().unwrap_or_else(|| "N/A".to_string()),
            ),
            (
                "Last Update",
                self.last_push
                    .map(|dt| dt.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Code Size", self.size_mb()),
        ]
    }
}

/// Fetch repository stats. Only the repository lookup itself can fail the call.
pub async fn fetch_stats<S: ContributionSource + ?Sized>(source: &S, repo: &RepoId) -> Result<RepoStats> {
    let repository = source.repository(repo).await?;

    let contributors = match source.contributors_page(repo, 1, MAX_PER_PAGE).await {
        Ok(page) => Some(page.len()),
        Err(e) => {
            debug!(error = %e, "contributor count unavailable");
            None
        }
    };

    let open_pull_requests = match source.pulls_page(repo, "open", 1, MAX_PER_PAGE).await {
        Ok(page) => Some(page.len()),
        Err(e) => {
            debug!(error = %e, "open pull request count unavailable");
            None
        }
    };

    let stats = RepoStats {
        full_name: repository.full_name,
        stars: repository.stargazers_count,
        forks: repository.forks_count,
        open_issues: repository.open_issues_count,
        watchers: repository.subscribers_count,
        contributors,
        open_pull_requests,
        license: repository
            .license
            .and_then(|l| l.spdx_id)
            .filter(|id| id != "NOASSERTION"),
        last_push: repository.pushed_at,
        size_kb: repository.size,
    };
    info!(repo = %repo, stars = stats.stars, "loaded repository stats");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::source::fake::{FakeSource, pull};
    use crate::github::{License, Repository};

    fn repository() -> Repository {
        Repository {
            full_name: "SandeepVashishtha/Eventra".to_string(),
            stargazers_count: 120,
            forks_count: 300,
            open_issues_count: 42,
            subscribers_count: 7,
            size: 2048,
            license: Some(License {
                spdx_id: Some("MIT".to_string()),
            }),
            pushed_at: DateTime::from_timestamp(1_750_000_000, 0),
        }
    }

    #[tokio::test]
    async fn test_fetch_stats() {
        let mut open = pull(9, "alice", &[], false);
        open.closed_at = None;
        let source = FakeSource {
            repository: Some(repository()),
            ..FakeSource::with_pulls(vec![open, pull(1, "bob", &[], true)])
        };

        let stats = fetch_stats(&source, &RepoId::new("SandeepVashishtha", "Eventra"))
            .await
            .unwrap();

        assert_eq!(stats.stars, 120);
        assert_eq!(stats.open_pull_requests, Some(1));
        assert_eq!(stats.contributors, Some(0));
        assert_eq!(stats.license.as_deref(), Some("MIT"));
        assert_eq!(stats.size_mb(), "2.0 MB");
    }

    #[tokio::test]
    async fn test_best_effort_counts() {
        let source = FakeSource {
            repository: Some(repository()),
            ..FakeSource::default()
        };
        source.set_failing(true);

        let stats = fetch_stats(&source, &RepoId::new("o", "r")).await.unwrap();
        assert_eq!(stats.open_pull_requests, None);

        let rows = stats.rows();
        let prs = rows.iter().find(|(label, _)| *label == "Pull Requests").unwrap();
        assert_eq!(prs.1, "—");
    }

    #[tokio::test]
    async fn test_missing_repository_fails() {
        let source = FakeSource::default();
        assert!(fetch_stats(&source, &RepoId::new("o", "r")).await.is_err());
    }
}
