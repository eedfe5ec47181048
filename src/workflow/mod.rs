//! The generate, review, act workflows shared by `commit` and `pr`.

pub mod commit;
pub mod pr;

pub use commit::{CommitAction, CommitOptions, run_commit};
pub use pr::{PullRequestOptions, normalize_list, run_pull_request, split_title_body};

use tracing::debug;

use crate::editor::Editor;
use crate::error::GitError;
use crate::git::VersionControl;
use crate::llm::TextGenerator;
use crate::review::Prompter;

/// Which changes a workflow describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffMode {
    /// Changes in the index.
    Staged,
    /// Every tracked change, as `git commit --all` would record.
    All,
    /// The current branch against its merge base with the named branch.
    Branch(String),
    /// Staged changes folded into the previous commit.
    Amend,
}

impl DiffMode {
    /// Mode for `quill commit`. The CLI rejects `--all` together with `--amend`.
    pub fn from_commit_flags(all: bool, amend: bool) -> Self {
        match (all, amend) {
            (_, true) => DiffMode::Amend,
            (true, false) => DiffMode::All,
            (false, false) => DiffMode::Staged,
        }
    }

    /// `git commit` flags implied by this mode.
    pub fn commit_flags(&self) -> &'static [&'static str] {
        match self {
            DiffMode::All => &["--all"],
            DiffMode::Amend => &["--amend"],
            DiffMode::Staged | DiffMode::Branch(_) => &[],
        }
    }
}

/// How a workflow invocation ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed { commit: String },
    PullRequestOpened { url: String },
    NoChanges,
    Cancelled,
}

/// The capabilities a workflow runs against.
pub struct Collaborators<'a> {
    pub vcs: &'a dyn VersionControl,
    pub generator: &'a dyn TextGenerator,
    pub prompter: &'a dyn Prompter,
    pub editor: &'a dyn Editor,
}

/// Collect the diff for `mode`, querying exactly one source.
///
/// Returns `None` when the diff is empty or whitespace only.
pub fn collect_diff(vcs: &dyn VersionControl, mode: &DiffMode) -> Result<Option<String>, GitError> {
    let diff = match mode {
        DiffMode::Staged | DiffMode::Amend => vcs.staged_diff()?,
        DiffMode::All => vcs.all_diff()?,
        DiffMode::Branch(base) => vcs.branch_diff(base)?,
    };

    debug!("Collected {} bytes of diff for {:?}", diff.len(), mode);

    if diff.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockVersionControl;

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(DiffMode::from_commit_flags(false, false), DiffMode::Staged);
        assert_eq!(DiffMode::from_commit_flags(true, false), DiffMode::All);
        assert_eq!(DiffMode::from_commit_flags(false, true), DiffMode::Amend);
    }

    #[test]
    fn test_commit_flags() {
        assert!(DiffMode::Staged.commit_flags().is_empty());
        assert_eq!(DiffMode::All.commit_flags(), &["--all"]);
        assert_eq!(DiffMode::Amend.commit_flags(), &["--amend"]);
    }

    #[test]
    fn test_whitespace_diff_is_no_changes() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff()
            .times(1)
            .returning(|| Ok(" \n\t\n".to_string()));

        assert_eq!(collect_diff(&vcs, &DiffMode::Staged).unwrap(), None);
    }

    #[test]
    fn test_branch_mode_queries_only_branch_diff() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().never();
        vcs.expect_all_diff().never();
        vcs.expect_branch_diff()
            .withf(|base| base == "develop")
            .times(1)
            .returning(|_| Ok("+x".to_string()));

        let diff = collect_diff(&vcs, &DiffMode::Branch("develop".into())).unwrap();
        assert_eq!(diff.as_deref(), Some("+x"));
    }
}
