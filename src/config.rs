//! Configuration file loading, validation, and first-run defaults.
//!
//! The file is TOML:
//!
//! ```toml
//! [api_keys]
//! gemini = "..."
//! github = "..."            # optional
//!
//! [llm]
//! model = "gemini-1.5-pro"  # optional
//!
//! [prompts]
//! system_commit = "system_prompt_commit.md"
//! user_commit = "user_prompt_commit.md"
//! system_pr = "system_prompt_pr.md"
//! user_pr = "user_prompt_pr.md"
//!
//! [editor]
//! command = ""              # optional
//! ```
//!
//! Relative prompt paths are resolved against the directory holding the
//! config file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "QUILL_CONFIG";

/// Environment variable that overrides `api_keys.gemini`.
pub const GEMINI_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Value written by `quill init`; treated as "not configured".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY";

const CONFIG_FILE_NAME: &str = "config.toml";
const SYSTEM_COMMIT_FILE: &str = "system_prompt_commit.md";
const USER_COMMIT_FILE: &str = "user_prompt_commit.md";
const SYSTEM_PR_FILE: &str = "system_prompt_pr.md";
const USER_PR_FILE: &str = "user_prompt_pr.md";

/// On-disk shape of the config file. Every field is optional here;
/// [`Config::parse`] decides what is required.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    api_keys: ApiKeys,
    #[serde(default)]
    llm: LlmSection,
    #[serde(default)]
    prompts: PromptSection,
    #[serde(default)]
    editor: EditorSection,
}

#[derive(Debug, Default, Deserialize)]
struct ApiKeys {
    gemini: Option<String>,
    github: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmSection {
    model: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptSection {
    system_commit: Option<PathBuf>,
    user_commit: Option<PathBuf>,
    system_pr: Option<PathBuf>,
    user_pr: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSection {
    command: Option<String>,
}

/// System and user template paths for one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    pub system: PathBuf,
    pub user: PathBuf,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// File this configuration was loaded from.
    pub path: PathBuf,
    pub gemini_api_key: String,
    /// GitHub token from the file, if any. See [`crate::github::auth`] for fallbacks.
    pub github_token: Option<String>,
    pub model: String,
    pub llm_base_url: String,
    pub commit_prompts: TemplatePaths,
    pub pr_prompts: TemplatePaths,
    /// Editor command from the file, if any. See [`crate::editor`] for fallbacks.
    pub editor: Option<String>,
}

impl Config {
    /// Load and validate the config file at `path`.
    ///
    /// `GEMINI_API_KEY` in the environment takes precedence over the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let env_key = env::var(GEMINI_KEY_ENV_VAR).ok();
        let config = Self::parse(path, &contents, env_key)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validate config `contents` as if read from `path`.
    pub fn parse(path: &Path, contents: &str, env_key: Option<String>) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let gemini_api_key = env_key
            .and_then(non_empty)
            .or_else(|| file.api_keys.gemini.and_then(non_empty))
            .filter(|key| key != API_KEY_PLACEHOLDER)
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: "gemini",
                env_var: GEMINI_KEY_ENV_VAR,
                path: path.to_path_buf(),
            })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |value: Option<PathBuf>, name: &'static str| {
            value
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| if p.is_absolute() { p } else { base_dir.join(p) })
                .ok_or(ConfigError::MissingTemplatePath { name })
        };

        let commit_prompts = TemplatePaths {
            system: resolve(file.prompts.system_commit, "system_commit")?,
            user: resolve(file.prompts.user_commit, "user_commit")?,
        };
        let pr_prompts = TemplatePaths {
            system: resolve(file.prompts.system_pr, "system_pr")?,
            user: resolve(file.prompts.user_pr, "user_pr")?,
        };

        debug!("Commit templates: {:?}", commit_prompts);
        debug!("PR templates: {:?}", pr_prompts);

        Ok(Self {
            path: path.to_path_buf(),
            gemini_api_key,
            github_token: file.api_keys.github.and_then(non_empty),
            model: file
                .llm
                .model
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_base_url: file
                .llm
                .base_url
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            commit_prompts,
            pr_prompts,
            editor: file.editor.command.and_then(non_empty),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pick the config file location.
///
/// Order: explicit path, `QUILL_CONFIG`, then `<config dir>/quill/config.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("quill").join(CONFIG_FILE_NAME))
}

const DEFAULT_CONFIG: &str = r#"# quill configuration

[api_keys]
# Gemini API key. The GEMINI_API_KEY environment variable overrides this value.
gemini = "YOUR_GEMINI_API_KEY"
# Token used by `quill pr`. When unset, GITHUB_TOKEN, GH_TOKEN, and
# `gh auth token` are tried in that order.
# github = ""

[llm]
model = "gemini-1.5-pro"

# Relative paths are resolved against this file's directory.
[prompts]
system_commit = "system_prompt_commit.md"
user_commit = "user_prompt_commit.md"
system_pr = "system_prompt_pr.md"
user_pr = "user_prompt_pr.md"

[editor]
# Leave empty to use git's core.editor, then $VISUAL or $EDITOR.
command = ""
"#;

const DEFAULT_SYSTEM_COMMIT: &str = "\
You are an expert software engineer who writes clear, concise git commit messages.
Follow the Conventional Commits format: `type(scope): subject`, with a subject of at
most 72 characters, written in the imperative mood. Add a body after a blank line only
when the change needs explanation; describe why, not how.
Respond with the commit message only, without code fences or commentary.
";

const DEFAULT_USER_COMMIT: &str = "\
Write a commit message for the following staged changes.

{diff}
";

const DEFAULT_SYSTEM_PR: &str = "\
You are an expert software engineer who writes helpful pull request descriptions.
The first line of your answer is the pull request title: short, specific, and without
markdown. Everything after it is the body, in markdown, with a short summary of the
change, the motivation, and anything reviewers should pay attention to.
Respond with the title and body only, without code fences or commentary.
";

const DEFAULT_USER_PR: &str = "\
Write a pull request title and description for the following changes.

{diff}
";

/// Write the default config file and prompt templates next to `config_path`.
///
/// Existing files are overwritten; callers decide whether that is wanted.
/// Returns the paths written.
pub fn write_default_files(config_path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| ConfigError::WriteFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (dir.join(SYSTEM_COMMIT_FILE), DEFAULT_SYSTEM_COMMIT),
        (dir.join(USER_COMMIT_FILE), DEFAULT_USER_COMMIT),
        (dir.join(SYSTEM_PR_FILE), DEFAULT_SYSTEM_PR),
        (dir.join(USER_PR_FILE), DEFAULT_USER_PR),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        fs::write(&path, contents).map_err(|source| ConfigError::WriteFailed {
            path: path.clone(),
            source,
        })?;
        info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
