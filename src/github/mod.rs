//! GitHub API operations using octocrab.

pub mod auth;
pub mod client;

pub use auth::resolve_github_token;
pub use client::GitHubClient;

use async_trait::async_trait;

use crate::error::GitHubError;

/// Everything needed to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestAction {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
    pub reviewers: Vec<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    /// Milestone number, already resolved from its name.
    pub milestone: Option<u64>,
}

/// A pull request the code host accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub url: String,
}

/// Trait for the code-hosting service.
///
/// This abstraction allows mocking GitHub in workflow tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Open a pull request and apply its reviewers, assignees, labels, and milestone.
    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &PullRequestAction,
    ) -> Result<CreatedPullRequest, GitHubError>;

    /// Look up a milestone number by exact title.
    async fn milestone_id(&self, owner: &str, repo: &str, name: &str)
    -> Result<Option<u64>, GitHubError>;
}
