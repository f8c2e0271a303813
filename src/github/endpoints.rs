// GitHub API endpoint functions.
// Typed methods for the repository, contributor, pull and user endpoints.

use async_trait::async_trait;

use crate::error::Result;

use super::client::GitHubClient;
use super::source::ContributionSource;
use super::types::{PullRequest, RepoContributor, RepoId, Repository, UserProfile};

impl GitHubClient {
    /// Get a repository.
    pub async fn get_repo(&self, repo: &RepoId) -> Result<Repository> {
        let response = self.get(&repo.api_path()).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get one page of repository contributors.
    pub async fn get_contributors(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepoContributor>> {
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self
            .get_with_params(&format!("{}/contributors", repo.api_path()), &params)
            .await?;
        // An empty repository answers 204 with no body
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let contributors: Vec<RepoContributor> = serde_json::from_str(&body)?;
        Ok(contributors)
    }

    /// Get one page of pull requests in the given state.
    pub async fn get_pulls(
        &self,
        repo: &RepoId,
        state: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>> {
        let params = [
            ("state", state.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self
            .get_with_params(&format!("{}/pulls", repo.api_path()), &params)
            .await?;
        let pulls: Vec<PullRequest> = response.json().await?;
        Ok(pulls)
    }

    /// Get a user's public profile.
    pub async fn get_user(&self, login: &str) -> Result<UserProfile> {
        let response = self.get(&format!("/users/{}", login)).await?;
        let profile: UserProfile = response.json().await?;
        Ok(profile)
    }
}

#[async_trait]
impl ContributionSource for GitHubClient {
    async fn repository(&self, repo: &RepoId) -> Result<Repository> {
        self.get_repo(repo).await
    }

    async fn contributors_page(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepoContributor>> {
        self.get_contributors(repo, page, per_page).await
    }

    async fn pulls_page(
        &self,
        repo: &RepoId,
        state: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>> {
        self.get_pulls(repo, state, page, per_page).await
    }

    async fn user_profile(&self, login: &str) -> Result<UserProfile> {
        self.get_user(login).await
    }
}
