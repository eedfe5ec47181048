//! Interactive review of generated text: accept, edit, or reject.
//!
//! ```text
//!            accept
//! Presenting ──────▶ Approved
//!   │    ▲   reject
//!   │    │ ────────▶ Rejected
//!   │ edit
//!   ▼    │
//! Editing ┘
//! ```
//!
//! Unrecognized answers re-ask without leaving `Presenting`.

use dialoguer::Input;
use tracing::debug;

use crate::editor::Editor;
use crate::error::{PromptError, WorkflowError};

const QUESTION: &str = "Use this message? [y]es / [e]dit / [n]o";

/// The user's answer to the review question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Accept,
    Edit,
    Reject,
}

impl ReviewChoice {
    /// Parse an answer, case-insensitively. Returns `None` for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "a" | "accept" => Some(ReviewChoice::Accept),
            "e" | "edit" => Some(ReviewChoice::Edit),
            "n" | "no" | "r" | "reject" => Some(ReviewChoice::Reject),
            _ => None,
        }
    }
}

/// Terminal result of a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved(String),
    Rejected,
}

#[derive(Debug)]
enum ReviewState {
    Presenting(String),
    Editing(String),
    Approved(String),
    Rejected,
}

/// Display and input side of the review.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Show the text under review.
    fn show(&self, text: &str);

    /// Ask `question` and return the raw answer.
    fn ask(&self, question: &str) -> Result<String, PromptError>;

    /// Tell the user something went sideways without stopping the review.
    fn warn(&self, message: &str);
}

/// [`Prompter`] on the controlling terminal.
pub struct TerminalPrompter;

const RULE: &str = "────────────────────────────────────────────────────────────";

impl Prompter for TerminalPrompter {
    fn show(&self, text: &str) {
        println!("\n{RULE}\n{text}\n{RULE}\n");
    }

    fn ask(&self, question: &str) -> Result<String, PromptError> {
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map_err(PromptError::Input)
    }

    fn warn(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Run the review loop on `initial` until the user accepts or rejects.
///
/// There is no iteration cap; the loop ends only on an accept or reject.
pub fn run_review(
    initial: String,
    prompter: &dyn Prompter,
    editor: &dyn Editor,
) -> Result<ReviewDecision, WorkflowError> {
    let mut state = ReviewState::Presenting(initial);

    loop {
        state = match state {
            ReviewState::Presenting(text) => {
                prompter.show(&text);
                match ask_choice(prompter)? {
                    ReviewChoice::Accept => ReviewState::Approved(text),
                    ReviewChoice::Edit => ReviewState::Editing(text),
                    ReviewChoice::Reject => ReviewState::Rejected,
                }
            }
            ReviewState::Editing(text) => {
                let edited = editor.edit(&text)?;
                let edited = edited.trim();
                if edited.is_empty() {
                    prompter.warn("The edited text is empty; keeping the previous version.");
                    ReviewState::Presenting(text)
                } else {
                    ReviewState::Presenting(edited.to_string())
                }
            }
            ReviewState::Approved(text) => return Ok(ReviewDecision::Approved(text)),
            ReviewState::Rejected => return Ok(ReviewDecision::Rejected),
        };
        debug!("Review state: {:?}", state);
    }
}

fn ask_choice(prompter: &dyn Prompter) -> Result<ReviewChoice, PromptError> {
    loop {
        let answer = prompter.ask(QUESTION)?;
        if let Some(choice) = ReviewChoice::parse(&answer) {
            return Ok(choice);
        }
        prompter.warn(&format!(
            "Unrecognized answer '{}'. Type y to accept, e to edit, or n to reject.",
            answer.trim()
        ));
    }
}
