// GitHub API module.
// Provides the client, the data source seam, and response types.

pub mod client;
pub mod endpoints;
pub mod source;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use source::{ContributionSource, MAX_PER_PAGE, PageLimits, collect_pages};
pub use types::*;
