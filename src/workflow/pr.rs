//! `quill pr`: describe the current branch and open a pull request.

use tracing::{debug, info};

use crate::error::WorkflowError;
use crate::github::{CodeHost, PullRequestAction};
use crate::llm::generate_message;
use crate::prompt::PromptTemplates;
use crate::review::{ReviewDecision, run_review};
use crate::workflow::{Collaborators, DiffMode, Outcome, collect_diff};

/// Options for one `pr` invocation, as given on the command line.
#[derive(Debug, Clone)]
pub struct PullRequestOptions {
    pub base: String,
    pub draft: bool,
    pub reviewers: Vec<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    /// Milestone title, resolved to its number before the PR is opened.
    pub milestone: Option<String>,
}

/// Flatten repeated and comma-separated values into a trimmed, de-duplicated list.
///
/// `["user1", "user2"]` and `["user1,user2"]` both give `["user1", "user2"]`.
pub fn normalize_list(values: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for item in values.iter().flat_map(|value| value.split(',')) {
        let item = item.trim();
        if !item.is_empty() && !normalized.iter().any(|existing| existing == item) {
            normalized.push(item.to_string());
        }
    }
    normalized
}

/// Split approved text into a title (first line) and body (the rest).
///
/// A leading markdown heading marker (`#`s followed by whitespace) on the
/// title is dropped; `#123 Fix crash` keeps its issue reference.
pub fn split_title_body(text: &str) -> Result<(String, String), WorkflowError> {
    let text = text.trim();
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let title = strip_heading_marker(first.trim()).trim();

    if title.is_empty() {
        return Err(WorkflowError::MissingTitle);
    }

    Ok((title.to_string(), rest.trim().to_string()))
}

fn strip_heading_marker(line: &str) -> &str {
    let rest = line.trim_start_matches('#');
    if rest.len() < line.len() && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        rest
    } else {
        line
    }
}

/// Generate a pull-request description for the current branch, review it, and open the PR.
pub async fn run_pull_request(
    collaborators: &Collaborators<'_>,
    host: &dyn CodeHost,
    templates: &PromptTemplates,
    options: &PullRequestOptions,
) -> Result<Outcome, WorkflowError> {
    let mode = DiffMode::Branch(options.base.clone());
    let Some(diff) = collect_diff(collaborators.vcs, &mode)? else {
        info!("No changes against {}", options.base);
        return Ok(Outcome::NoChanges);
    };

    let (owner, repo) = collaborators.vcs.repo_info()?;
    let head = collaborators.vcs.current_branch()?;
    debug!("Pull request {}/{}: {} -> {}", owner, repo, head, options.base);

    let request = templates.pull_request_request(&diff);
    info!("Generating pull request description");
    let text = generate_message(collaborators.generator, &request).await?;

    let text = match run_review(text, collaborators.prompter, collaborators.editor)? {
        ReviewDecision::Rejected => {
            info!("Pull request cancelled");
            return Ok(Outcome::Cancelled);
        }
        ReviewDecision::Approved(text) => text,
    };

    let (title, body) = split_title_body(&text)?;

    let milestone = match options
        .milestone
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        Some(name) => {
            let number = host.milestone_id(&owner, &repo, name).await?.ok_or_else(|| {
                WorkflowError::MilestoneNotFound {
                    name: name.to_string(),
                    owner: owner.clone(),
                    repo: repo.clone(),
                }
            })?;
            Some(number)
        }
        None => None,
    };

    let action = PullRequestAction {
        title,
        body,
        head,
        base: options.base.clone(),
        draft: options.draft,
        reviewers: normalize_list(&options.reviewers),
        assignees: normalize_list(&options.assignees),
        labels: normalize_list(&options.labels),
        milestone,
    };

    let created = host.create_pull_request(&owner, &repo, &action).await?;
    info!("Opened pull request #{}", created.number);

    Ok(Outcome::PullRequestOpened { url: created.url })
}
