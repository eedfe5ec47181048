//! `quill commit`: describe the pending changes and commit them.

use tracing::info;

use crate::error::WorkflowError;
use crate::llm::generate_message;
use crate::prompt::PromptTemplates;
use crate::review::{ReviewDecision, run_review};
use crate::workflow::{Collaborators, DiffMode, Outcome, collect_diff};

/// Options for one `commit` invocation.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub mode: DiffMode,
    /// Extra `git commit` arguments, forwarded in order.
    pub passthrough: Vec<String>,
}

/// An approved commit, ready to hand to git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAction {
    pub message: String,
    /// Mode flags followed by the passthrough arguments.
    pub args: Vec<String>,
}

impl CommitAction {
    pub fn new(message: String, mode: &DiffMode, passthrough: &[String]) -> Self {
        let args = mode
            .commit_flags()
            .iter()
            .map(|flag| flag.to_string())
            .chain(passthrough.iter().cloned())
            .collect();
        Self { message, args }
    }
}

/// Generate a commit message for the selected changes, review it, and commit.
pub async fn run_commit(
    collaborators: &Collaborators<'_>,
    templates: &PromptTemplates,
    options: &CommitOptions,
) -> Result<Outcome, WorkflowError> {
    let Some(diff) = collect_diff(collaborators.vcs, &options.mode)? else {
        info!("No changes to commit");
        return Ok(Outcome::NoChanges);
    };

    let previous_message = match options.mode {
        DiffMode::Amend => Some(collaborators.vcs.last_commit_message()?),
        _ => None,
    };

    let request = templates.commit_request(&diff, previous_message.as_deref());
    info!("Generating commit message");
    let message = generate_message(collaborators.generator, &request).await?;

    match run_review(message, collaborators.prompter, collaborators.editor)? {
        ReviewDecision::Rejected => {
            info!("Commit cancelled");
            Ok(Outcome::Cancelled)
        }
        ReviewDecision::Approved(message) => {
            let action = CommitAction::new(message, &options.mode, &options.passthrough);
            let commit = collaborators.vcs.commit(&action.message, &action.args)?;
            info!("Committed {}", commit);
            Ok(Outcome::Committed { commit })
        }
    }
}
