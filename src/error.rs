//! Error types for quill modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, validating, or initialising the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory for this platform")]
    NoConfigDir,

    #[error("Config file not found at {}. Run `quill init` to create one.", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "No {provider} API key configured. Set api_keys.{provider} in {} or export {env_var}.",
        path.display()
    )]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
        path: PathBuf,
    },

    #[error("Prompt template '{name}' is missing from the [prompts] section of the config file")]
    MissingTemplatePath { name: &'static str },

    #[error("Failed to read prompt template {}: {source}", path.display())]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "GitHub authentication failed: no token found. Set api_keys.github in the config file, run 'gh auth login', or set GITHUB_TOKEN"
    )]
    MissingGitHubToken,

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Repository has no commits yet")]
    NoCommits,

    #[error("HEAD is detached; check out a branch before opening a pull request")]
    DetachedHead,

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to read commit: {0}")]
    ReadCommit(#[source] git2::Error),

    #[error("No 'origin' remote found")]
    NoOriginRemote,

    #[error("Failed to parse repository URL '{0}'")]
    InvalidRepositoryUrl(String),

    #[error("Failed to prepare commit message file: {0}")]
    MessageFile(#[source] std::io::Error),

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        operation: &'static str,
        code: Option<i32>,
    },
}

/// Errors from the text-generation provider.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request to the text-generation service failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Text-generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Text-generation service returned an unreadable response: {0}")]
    MalformedResponse(String),

    #[error("Text-generation service returned no usable content")]
    EmptyResponse,
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Api(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API")]
    RateLimited,

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Pull request {url} was created, but applying {step} failed: {source}")]
    FollowUpFailed {
        url: String,
        step: &'static str,
        #[source]
        source: Box<GitHubError>,
    },
}

/// Errors from the external editor session.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor command is empty")]
    EmptyCommand,

    #[error("Failed to prepare the scratch file for editing: {0}")]
    ScratchFile(#[source] std::io::Error),

    #[error("Failed to launch editor '{editor}': {source}")]
    SpawnFailed {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{editor}' exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit { editor: String, code: Option<i32> },
}

/// Errors from interactive prompts.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to read input: {0}")]
    Input(#[source] dialoguer::Error),
}

/// Terminal errors for a single commit or pull-request invocation.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Milestone '{name}' not found in {owner}/{repo}; no pull request was created")]
    MilestoneNotFound {
        name: String,
        owner: String,
        repo: String,
    },

    #[error("The generated pull request has no title line")]
    MissingTitle,
}
