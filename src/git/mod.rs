//! Version-control access: diffs, commit metadata, and `git commit`.

pub mod remote;
pub mod repository;

pub use remote::parse_github_remote;
pub use repository::GitRepository;

use crate::error::GitError;

/// Version-control operations the workflows depend on.
///
/// This abstraction allows substituting the repository in tests.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Diff of changes added to the index but not yet committed.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Diff of every tracked change, staged or not.
    fn all_diff(&self) -> Result<String, GitError>;

    /// Diff of the current branch against its merge base with `base`.
    fn branch_diff(&self, base: &str) -> Result<String, GitError>;

    /// Full message of the commit at HEAD.
    fn last_commit_message(&self) -> Result<String, GitError>;

    /// `(owner, repo)` parsed from the `origin` remote.
    fn repo_info(&self) -> Result<(String, String), GitError>;

    /// Short name of the checked-out branch.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Commit with `message`, appending `args` to the `git commit` invocation.
    ///
    /// Returns the abbreviated id of the new HEAD.
    fn commit(&self, message: &str, args: &[String]) -> Result<String, GitError>;
}
