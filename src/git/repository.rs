//! Repository access using git2, with commits delegated to the `git` binary.
//!
//! Reads (diffs, HEAD metadata, remotes) go through git2. Committing shells out
//! to `git commit -F <file>` so that hooks, signing, and any passthrough flags
//! behave exactly as they would on the command line.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use git2::{Commit, Diff, DiffFormat, ErrorCode, Repository, Tree};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::GitError;
use crate::git::VersionControl;
use crate::git::remote::parse_github_remote;

/// Maximum characters for the unified diff text before truncation.
const MAX_DIFF_LENGTH: usize = 30_000;

/// Marker appended to diffs cut at [`MAX_DIFF_LENGTH`].
const TRUNCATION_MARKER: &str = "\n[diff truncated]\n";

/// A git repository on disk.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing `path`, searching parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    /// Wrap an already-open repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Directory `git` commands run in.
    fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    fn head_commit(&self) -> Result<Commit<'_>, GitError> {
        match self.repo.head() {
            Ok(head) => head.peel_to_commit().map_err(GitError::ReadCommit),
            Err(e) if is_unborn(&e) => Err(GitError::NoCommits),
            Err(e) => Err(GitError::ReadCommit(e)),
        }
    }

    /// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
    ///
    /// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
    fn head_tree(&self) -> Result<Option<Tree<'_>>, GitError> {
        let head_ref = match self.repo.head() {
            Ok(r) => r,
            Err(e) if is_unborn(&e) => return Ok(None),
            Err(e) => return Err(GitError::DiffFailed(e)),
        };

        let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
        Ok(Some(tree))
    }

    /// Resolve `base` as given, then as a branch on `origin`.
    fn resolve_base(&self, base: &str) -> Result<Commit<'_>, GitError> {
        let local = self.repo.revparse_single(base).and_then(|o| o.peel_to_commit());
        match local {
            Ok(commit) => Ok(commit),
            Err(local_err) => {
                let remote = format!("origin/{base}");
                self.repo
                    .revparse_single(&remote)
                    .and_then(|o| o.peel_to_commit())
                    .map_err(|_| GitError::ReferenceNotFound(base.to_string(), local_err))
            }
        }
    }

    fn head_short_id(&self) -> Result<String, GitError> {
        let commit = self.head_commit()?;
        let short = commit.as_object().short_id().map_err(GitError::ReadCommit)?;
        Ok(short.as_str().unwrap_or_default().to_string())
    }
}

impl VersionControl for GitRepository {
    fn staged_diff(&self) -> Result<String, GitError> {
        let head_tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(GitError::DiffFailed)?;
        render_patch(&diff)
    }

    fn all_diff(&self) -> Result<String, GitError> {
        let head_tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), None)
            .map_err(GitError::DiffFailed)?;
        render_patch(&diff)
    }

    fn branch_diff(&self, base: &str) -> Result<String, GitError> {
        let base_commit = self.resolve_base(base)?;
        let head_commit = self.head_commit()?;

        let merge_base = self
            .repo
            .merge_base(base_commit.id(), head_commit.id())
            .map_err(GitError::DiffFailed)?;
        debug!("Merge base of {} and HEAD is {}", base, merge_base);

        let base_tree = self
            .repo
            .find_commit(merge_base)
            .and_then(|c| c.tree())
            .map_err(GitError::DiffFailed)?;
        let head_tree = head_commit.tree().map_err(GitError::DiffFailed)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)
            .map_err(GitError::DiffFailed)?;
        render_patch(&diff)
    }

    fn last_commit_message(&self) -> Result<String, GitError> {
        let commit = self.head_commit()?;
        let message = String::from_utf8_lossy(commit.message_bytes());
        Ok(message.trim_end().to_string())
    }

    fn repo_info(&self) -> Result<(String, String), GitError> {
        let remote = self
            .repo
            .find_remote("origin")
            .map_err(|_| GitError::NoOriginRemote)?;
        let url = remote.url().ok_or(GitError::NoOriginRemote)?;
        parse_github_remote(url)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => {
                head.shorthand().map(String::from).ok_or(GitError::DetachedHead)
            }
            Ok(_) => Err(GitError::DetachedHead),
            Err(e) if is_unborn(&e) => Err(GitError::NoCommits),
            Err(e) => Err(GitError::ReadCommit(e)),
        }
    }

    fn commit(&self, message: &str, args: &[String]) -> Result<String, GitError> {
        // Dropping the handle removes the file, whatever git did with it.
        let mut file = NamedTempFile::new().map_err(GitError::MessageFile)?;
        file.write_all(message.as_bytes())
            .and_then(|()| file.flush())
            .map_err(GitError::MessageFile)?;

        debug!("Running git commit -F {} {:?}", file.path().display(), args);

        let status = Command::new("git")
            .current_dir(self.workdir())
            .arg("commit")
            .arg("-F")
            .arg(file.path())
            .args(args)
            .status()
            .map_err(|source| GitError::SpawnFailed {
                operation: "commit",
                source,
            })?;

        if !status.success() {
            return Err(GitError::CommandFailed {
                operation: "commit",
                code: status.code(),
            });
        }

        self.head_short_id()
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound
}

/// Render a diff as unified patch text, capped at [`MAX_DIFF_LENGTH`].
fn render_patch(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut text = String::new();
    let mut truncated = false;

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if truncated {
            return true;
        }

        let content = String::from_utf8_lossy(line.content());
        if text.len() + content.len() + 1 > MAX_DIFF_LENGTH {
            truncated = true;
            return true;
        }

        // Include the origin character for content lines
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&content);

        true
    })
    .map_err(GitError::DiffFailed)?;

    if truncated {
        warn!("Diff exceeds {} characters; truncating", MAX_DIFF_LENGTH);
        text.push_str(TRUNCATION_MARKER);
    }

    Ok(text)
}
