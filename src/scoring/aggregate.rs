// Leaderboard aggregation.
// Folds merged, qualifying pull requests into ranked per-author totals.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::github::{
    ContributionSource, PageLimits, PullRequest, RepoContributor, RepoId, collect_pages,
};

use super::rules::ScoringRules;

/// One leaderboard row. Keyed by GitHub login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    pub profile: Option<String>,
    pub points: u32,
    pub prs: u32,
}

/// Display metadata looked up from the repository contributors list.
#[derive(Debug, Clone, Default)]
struct ContributorInfo {
    name: Option<String>,
    avatar: Option<String>,
    profile: Option<String>,
}

/// Leaderboard order: points desc, PR count desc, then username.
pub fn leaderboard_order(a: &Contributor, b: &Contributor) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.prs.cmp(&a.prs))
        .then_with(|| a.username.cmp(&b.username))
}

/// Fold pull requests into a sorted leaderboard.
///
/// Only merged PRs with a qualifying label count. A qualifying PR adds to
/// `prs` even when none of its labels carry points.
pub fn aggregate(
    pulls: &[PullRequest],
    directory: &[RepoContributor],
    rules: &ScoringRules,
) -> Vec<Contributor> {
    let info: HashMap<&str, ContributorInfo> = directory
        .iter()
        .map(|c| {
            (
                c.login.as_str(),
                ContributorInfo {
                    name: c.name.clone(),
                    avatar: c.avatar_url.clone(),
                    profile: c.html_url.clone(),
                },
            )
        })
        .collect();

    let mut by_author: BTreeMap<String, Contributor> = BTreeMap::new();

    for pr in pulls {
        if !pr.is_merged() || !rules.qualifies(&pr.labels) {
            continue;
        }

        let author = &pr.user.login;
        let entry = by_author.entry(author.clone()).or_insert_with(|| {
            let known = info.get(author.as_str());
            Contributor {
                username: author.clone(),
                name: known
                    .and_then(|i| i.name.clone())
                    .unwrap_or_else(|| author.clone()),
                avatar: known
                    .and_then(|i| i.avatar.clone())
                    .or_else(|| pr.user.avatar_url.clone()),
                profile: known
                    .and_then(|i| i.profile.clone())
                    .or_else(|| pr.user.html_url.clone()),
                points: 0,
                prs: 0,
            }
        });

        entry.points += rules.points_for(&pr.labels);
        entry.prs += 1;
    }

    let mut contributors: Vec<Contributor> = by_author.into_values().collect();
    contributors.sort_by(leaderboard_order);
    contributors
}

/// Fetch contributors and closed PRs for `repo`, then aggregate.
///
/// Fails on the first failed page; nothing partial is returned.
pub async fn fetch_leaderboard<S: ContributionSource + ?Sized>(
    source: &S,
    repo: &RepoId,
    rules: &ScoringRules,
    limits: PageLimits,
) -> Result<Vec<Contributor>> {
    let contributors_endpoint = format!("{}/contributors", repo.api_path());
    let directory = collect_pages(&contributors_endpoint, limits, move |page| {
        source.contributors_page(repo, page, limits.per_page)
    })
    .await?;
    debug!(count = directory.len(), "loaded contributor directory");

    let pulls_endpoint = format!("{}/pulls", repo.api_path());
    let pulls = collect_pages(&pulls_endpoint, limits, move |page| {
        source.pulls_page(repo, "closed", page, limits.per_page)
    })
    .await?;

    let leaderboard = aggregate(&pulls, &directory, rules);
    info!(
        repo = %repo,
        closed_pulls = pulls.len(),
        contributors = leaderboard.len(),
        "aggregated leaderboard"
    );
    Ok(leaderboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::source::fake::{FakeSource, pull};

    fn repo() -> RepoId {
        RepoId::new("SandeepVashishtha", "Eventra")
    }

    #[test]
    fn test_single_level_two_pr() {
        let pulls = vec![pull(1, "alice", &["gssoc", "level-2"], true)];
        let board = aggregate(&pulls, &[], &ScoringRules::default());

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].name, "alice");
        assert_eq!(board[0].points, 7);
        assert_eq!(board[0].prs, 1);
    }

    #[test]
    fn test_unlabeled_and_unmerged_prs_ignored() {
        let pulls = vec![
            pull(1, "alice", &["level-3", "bug"], true),
            pull(2, "bob", &["gssoc", "level-3"], false),
            pull(3, "carol", &[], true),
        ];
        let board = aggregate(&pulls, &[], &ScoringRules::default());
        assert!(board.is_empty());
    }

    #[test]
    fn test_qualifying_pr_without_level_counts_as_pr() {
        let pulls = vec![
            pull(1, "alice", &["GSSoC'25"], true),
            pull(2, "alice", &["gssoc", "level-1"], true),
        ];
        let board = aggregate(&pulls, &[], &ScoringRules::default());
        assert_eq!(board[0].points, 3);
        assert_eq!(board[0].prs, 2);
    }

    #[test]
    fn test_multiple_levels_are_summed() {
        let pulls = vec![pull(1, "alice", &["gssoc", "level-1", "level-2"], true)];
        let board = aggregate(&pulls, &[], &ScoringRules::default());
        assert_eq!(board[0].points, 10);
    }

    #[test]
    fn test_order_and_tie_breaks() {
        let pulls = vec![
            pull(1, "dave", &["gssoc", "level-1"], true),
            pull(2, "bob", &["gssoc", "level-3"], true),
            pull(3, "alice", &["gssoc", "level-3"], true),
            pull(4, "carol", &["gssoc", "level-1"], true),
            pull(5, "carol", &["gssoc"], true),
        ];
        let board = aggregate(&pulls, &[], &ScoringRules::default());
        let names: Vec<&str> = board.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let pulls = vec![
            pull(1, "zed", &["gssoc", "level-2"], true),
            pull(2, "amy", &["gssoc", "level-2"], true),
            pull(3, "kim", &["gsoc", "level-1"], true),
        ];
        let rules = ScoringRules::default();
        assert_eq!(aggregate(&pulls, &[], &rules), aggregate(&pulls, &[], &rules));
    }

    #[test]
    fn test_directory_metadata_preferred() {
        let pulls = vec![pull(1, "alice", &["gssoc", "level-1"], true)];
        let directory = vec![RepoContributor {
            login: "alice".to_string(),
            name: Some("Alice Liddell".to_string()),
            avatar_url: Some("https://avatars.example/dir-alice".to_string()),
            html_url: Some("https://github.com/alice".to_string()),
            contributions: 12,
        }];
        let board = aggregate(&pulls, &directory, &ScoringRules::default());
        assert_eq!(board[0].name, "Alice Liddell");
        assert_eq!(
            board[0].avatar.as_deref(),
            Some("https://avatars.example/dir-alice")
        );
    }

    #[tokio::test]
    async fn test_fetch_leaderboard_across_pages() {
        let pulls: Vec<_> = (1..=5)
            .map(|n| pull(n, if n % 2 == 0 { "bob" } else { "alice" }, &["gssoc", "level-1"], true))
            .collect();
        let source = FakeSource::with_pulls(pulls);
        let limits = PageLimits {
            per_page: 2,
            max_pages: 10,
        };

        let board = fetch_leaderboard(&source, &repo(), &ScoringRules::default(), limits)
            .await
            .unwrap();

        assert_eq!(source.pages_requested(), 3);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].points, 9);
        assert_eq!(board[1].username, "bob");
        assert_eq!(board[1].prs, 2);
    }

    #[tokio::test]
    async fn test_fetch_leaderboard_aborts_on_failed_page() {
        let pulls: Vec<_> = (1..=5)
            .map(|n| pull(n, "alice", &["gssoc", "level-1"], true))
            .collect();
        let source = FakeSource {
            fail_pulls_on_page: Some(2),
            ..FakeSource::with_pulls(pulls)
        };
        let limits = PageLimits {
            per_page: 2,
            max_pages: 10,
        };

        let result = fetch_leaderboard(&source, &repo(), &ScoringRules::default(), limits).await;
        assert!(result.is_err());
    }
}
