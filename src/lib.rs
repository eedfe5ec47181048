//! quill - A CLI tool that drafts commit messages and pull-request descriptions with an LLM.
//!
//! # Overview
//!
//! quill collects a diff from git, sends it with a prompt template to Gemini,
//! lets the user accept, edit, or reject the result, and then either runs
//! `git commit` or opens a GitHub pull request.

pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod github;
pub mod llm;
pub mod prompt;
pub mod review;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{
    ConfigError, EditorError, GitError, GitHubError, LlmError, PromptError, WorkflowError,
};
pub use workflow::{Collaborators, DiffMode, Outcome};
