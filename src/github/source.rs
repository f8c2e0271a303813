// Data source seam for the fetch pipeline.
// The HTTP client implements it; tests substitute an in-memory fake.

use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BoardError, Result};

use super::types::{PullRequest, RepoContributor, RepoId, Repository, UserProfile};

/// GitHub's hard cap on `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// Everything the leaderboard, contributors and stats refreshes read from GitHub.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    async fn repository(&self, repo: &RepoId) -> Result<Repository>;

    async fn contributors_page(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepoContributor>>;

    async fn pulls_page(
        &self,
        repo: &RepoId,
        state: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>>;

    async fn user_profile(&self, login: &str) -> Result<UserProfile>;
}

/// Limits for walking a paginated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub per_page: u32,
    pub max_pages: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            max_pages: 50,
        }
    }
}

/// Fetch pages one at a time until an empty or short page.
///
/// Page `n + 1` is only requested after page `n` resolved. If `max_pages`
/// full pages come back the walk fails with [`BoardError::PageLimit`]
/// instead of returning a truncated list.
pub async fn collect_pages<T, F, Fut>(endpoint: &str, limits: PageLimits, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let per_page = limits.per_page.clamp(1, MAX_PER_PAGE);
    let mut items = Vec::new();

    for page in 1..=limits.max_pages {
        let batch = fetch(page).await?;
        let len = batch.len();
        debug!(endpoint, page, len, "fetched page");
        items.extend(batch);

        if len < per_page as usize {
            return Ok(items);
        }
    }

    Err(BoardError::PageLimit {
        endpoint: endpoint.to_string(),
        max_pages: limits.max_pages,
    })
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn test_collect_pages_stops_on_short_page() {
        let calls = Cell::new(0);
        let limits = PageLimits {
            per_page: 2,
            max_pages: 10,
        };
        let items = collect_pages("/things", limits, |page| {
            calls.set(calls.get() + 1);
            async move {
                Ok(match page {
                    1 => vec![1, 2],
                    2 => vec![3],
                    _ => vec![99],
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_empty_page() {
        let limits = PageLimits {
            per_page: 2,
            max_pages: 10,
        };
        let items = collect_pages("/things", limits, |page| async move {
            Ok(if page == 1 { vec![1, 2] } else { Vec::new() })
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_collect_pages_ceiling_is_an_error() {
        let limits = PageLimits {
            per_page: 1,
            max_pages: 3,
        };
        let result = collect_pages("/endless", limits, |page| async move { Ok(vec![page]) }).await;

        match result {
            Err(BoardError::PageLimit { endpoint, max_pages }) => {
                assert_eq!(endpoint, "/endless");
                assert_eq!(max_pages, 3);
            }
            other => panic!("expected page limit error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collect_pages_propagates_failure() {
        let result: Result<Vec<u32>> = collect_pages("/broken", PageLimits::default(), |page| async move {
            if page == 1 {
                Ok(vec![0; MAX_PER_PAGE as usize])
            } else {
                Err(BoardError::Other("boom".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(BoardError::Other(_))));
    }
}
