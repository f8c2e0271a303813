// Error types for eventra-board.
// Covers GitHub API failures, cache and config IO, and pagination limits.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{endpoint} still had results after {max_pages} pages")]
    PageLimit { endpoint: String, max_pages: u32 },

    #[error("Invalid repository '{0}', expected OWNER/NAME")]
    InvalidRepo(String),

    #[error("{0}")]
    Other(String),
}

impl BoardError {
    /// Whether retrying later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BoardError::Api(_) | BoardError::RateLimited { .. } | BoardError::Other(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
