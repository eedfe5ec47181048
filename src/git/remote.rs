//! Remote URL parsing.

use crate::error::GitError;

/// Extract owner and repo from a GitHub remote URL.
///
/// Accepts the SCP-like SSH form (`git@github.com:owner/repo.git`), the
/// `ssh://` form, and HTTPS URLs, with or without the `.git` suffix.
pub fn parse_github_remote(url: &str) -> Result<(String, String), GitError> {
    let invalid = || GitError::InvalidRepositoryUrl(url.to_string());

    // Handle SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path).ok_or_else(invalid);
    }

    // Handle ssh://git@github.com/owner/repo.git and https://github.com/owner/repo.git
    if url.contains("github.com/") {
        let path = url.split("github.com/").nth(1).ok_or_else(invalid)?;
        return parse_owner_repo_path(path).ok_or_else(invalid);
    }

    Err(invalid())
}

fn parse_owner_repo_path(path: &str) -> Option<(String, String)> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');

    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}
