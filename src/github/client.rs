//! Pull-request creation and milestone lookup via octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::GitHubError;
use crate::github::{CodeHost, CreatedPullRequest, PullRequestAction};

#[derive(Debug, Serialize)]
struct NewPullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
    draft: bool,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    reviewers: &'a [String],
}

/// Issue fields a pull request shares with its issue.
#[derive(Debug, Default, Serialize)]
struct IssueUpdate<'a> {
    #[serde(skip_serializing_if = "is_empty_list")]
    labels: &'a [String],
    #[serde(skip_serializing_if = "is_empty_list")]
    assignees: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone: Option<u64>,
}

fn is_empty_list(list: &&[String]) -> bool {
    list.is_empty()
}

impl IssueUpdate<'_> {
    fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.assignees.is_empty() && self.milestone.is_none()
    }
}

#[derive(Debug, Serialize)]
struct MilestoneQuery {
    state: &'static str,
    per_page: u8,
    page: u32,
}

/// Milestones requested per page (GitHub's maximum).
const MILESTONES_PER_PAGE: u8 = 100;

/// Page limit to prevent infinite loops on a misbehaving server.
const MAX_MILESTONE_PAGES: u32 = 50;

#[derive(Debug, Deserialize)]
struct Milestone {
    number: u64,
    title: String,
}

/// [`CodeHost`] backed by the GitHub REST API.
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Build a client authenticated with `token`.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::Api(Box::new(e)))?;
        Ok(Self::with_client(octocrab))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &PullRequestAction,
    ) -> Result<CreatedPullRequest, GitHubError> {
        let route = format!("/repos/{owner}/{repo}/pulls");
        let payload = NewPullRequest {
            title: &pr.title,
            body: &pr.body,
            head: &pr.head,
            base: &pr.base,
            draft: pr.draft,
        };

        debug!("Opening pull request {} -> {} on {}/{}", pr.head, pr.base, owner, repo);

        let created: PullRequestResponse = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| map_octocrab_error(e, owner, repo))?;

        info!("Created pull request #{}", created.number);

        let follow_up = |step: &'static str, source: GitHubError| GitHubError::FollowUpFailed {
            url: created.html_url.clone(),
            step,
            source: Box::new(source),
        };

        if !pr.reviewers.is_empty() {
            let route = format!(
                "/repos/{owner}/{repo}/pulls/{}/requested_reviewers",
                created.number
            );
            let _: serde_json::Value = self
                .octocrab
                .post(route, Some(&ReviewRequest { reviewers: &pr.reviewers }))
                .await
                .map_err(|e| follow_up("reviewers", map_octocrab_error(e, owner, repo)))?;
        }

        let update = IssueUpdate {
            labels: &pr.labels,
            assignees: &pr.assignees,
            milestone: pr.milestone,
        };
        if !update.is_empty() {
            let route = format!("/repos/{owner}/{repo}/issues/{}", created.number);
            let _: serde_json::Value = self
                .octocrab
                .patch(route, Some(&update))
                .await
                .map_err(|e| {
                    follow_up(
                        "labels, assignees, and milestone",
                        map_octocrab_error(e, owner, repo),
                    )
                })?;
        }

        Ok(CreatedPullRequest {
            number: created.number,
            url: created.html_url,
        })
    }

    async fn milestone_id(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Option<u64>, GitHubError> {
        let route = format!("/repos/{owner}/{repo}/milestones");
        let mut page = 1u32;

        loop {
            let query = MilestoneQuery {
                state: "all",
                per_page: MILESTONES_PER_PAGE,
                page,
            };

            let milestones: Vec<Milestone> = self
                .octocrab
                .get(&route, Some(&query))
                .await
                .map_err(|e| map_octocrab_error(e, owner, repo))?;

            debug!(
                "Found {} milestones on page {} of {}/{}",
                milestones.len(),
                page,
                owner,
                repo
            );

            let last_page = milestones.len() < usize::from(MILESTONES_PER_PAGE);
            if let Some(found) = milestones.into_iter().find(|m| m.title == name) {
                return Ok(Some(found.number));
            }
            if last_page {
                return Ok(None);
            }

            page += 1;

            if page > MAX_MILESTONE_PAGES {
                warn!(
                    "Reached {}-page safety limit while listing milestones for {}/{}",
                    MAX_MILESTONE_PAGES, owner, repo
                );
                return Ok(None);
            }
        }
    }
}

/// Map an octocrab failure onto the error a user can act on.
fn map_octocrab_error(e: octocrab::Error, owner: &str, repo: &str) -> GitHubError {
    // Check both Display and Debug output to handle different octocrab error formats
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);

    if err_display.to_lowercase().contains("rate limit")
        || err_debug.to_lowercase().contains("rate limit")
    {
        return GitHubError::RateLimited;
    }
    if err_display.contains("Not Found") || err_debug.contains("Not Found") {
        return GitHubError::RepositoryNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        };
    }
    GitHubError::Api(Box::new(e))
}
