// GitHub API HTTP client.
// Handles optional token auth, rate limit tracking, timeouts, and status mapping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{BoardError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with optional authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    limit: AtomicU64,
    remaining: AtomicU64,
    reset: AtomicU64,
}

impl GitHubClient {
    /// Create a client. Anonymous access works but is heavily rate limited.
    pub fn new(token: Option<&str>, base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("token {}", token.trim()))
                .map_err(|e| BoardError::Other(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("eventra-board"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(BoardError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit: AtomicU64::new(0),
            remaining: AtomicU64::new(0),
            reset: AtomicU64::new(0),
        })
    }

    /// Snapshot of the most recently observed rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        RateLimit {
            limit: self.limit.load(Ordering::Relaxed),
            remaining: self.remaining.load(Ordering::Relaxed),
            reset: self.reset.load(Ordering::Relaxed),
        }
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(BoardError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = self.client.get(&url).query(params);
        debug!(%url, "GET with params");
        let response = request.send().await.map_err(BoardError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let headers = response.headers();
        if let Some(limit) = header_u64(headers, "x-ratelimit-limit") {
            self.limit.store(limit, Ordering::Relaxed);
        }
        if let Some(remaining) = header_u64(headers, "x-ratelimit-remaining") {
            self.remaining.store(remaining, Ordering::Relaxed);
        }
        if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
            self.reset.store(reset, Ordering::Relaxed);
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(response),
            StatusCode::UNAUTHORIZED => Err(BoardError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(BoardError::NotFound(url))
            }
            status @ (StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) => {
                match rate_limit_reset(status, response.headers()) {
                    Some(reset_at) => Err(BoardError::RateLimited { reset_at }),
                    None => Err(BoardError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    ))),
                }
            }
            status => Err(BoardError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Reset time when a 403/429 response is a primary rate limit.
///
/// Only the headers on the failing response count. A 403 without
/// `x-ratelimit-remaining: 0` is a permission or abuse block.
fn rate_limit_reset(status: StatusCode, headers: &HeaderMap) -> Option<String> {
    let exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);
    if !exhausted && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }
    Some(
        header_u64(headers, "x-ratelimit-reset")
            .map(format_reset)
            .unwrap_or_else(|| "unknown".to_string()),
    )
}

/// Format a rate limit reset epoch as local wall-clock time.
fn format_reset(reset: u64) -> String {
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_without_token() {
        let client = GitHubClient::new(None, GITHUB_API_BASE, Duration::from_secs(5)).unwrap();
        assert_eq!(client.rate_limit(), RateLimit::default());
        assert_eq!(client.base_url, "https://api.github.com");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            GitHubClient::new(Some("abc"), "http://localhost:8080/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = GitHubClient::new(Some("bad\ntoken"), GITHUB_API_BASE, Duration::from_secs(5));
        assert!(result.is_err());
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forbidden_without_rate_headers_is_not_rate_limited() {
        assert_eq!(rate_limit_reset(StatusCode::FORBIDDEN, &HeaderMap::new()), None);
        assert_eq!(
            rate_limit_reset(
                StatusCode::FORBIDDEN,
                &headers(&[("x-ratelimit-remaining", "12")])
            ),
            None
        );
    }

    #[test]
    fn test_exhausted_quota_is_rate_limited() {
        let exhausted = headers(&[
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1750000000"),
        ]);
        assert_eq!(
            rate_limit_reset(StatusCode::FORBIDDEN, &exhausted),
            Some(format_reset(1_750_000_000))
        );
        assert_eq!(
            rate_limit_reset(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new()).as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn test_format_reset_unknown() {
        assert_eq!(format_reset(i64::MAX as u64), "unknown");
    }
}
