//! GitHub token discovery.
//!
//! Order:
//! 1. `api_keys.github` from the config file
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var
//! 4. `gh auth token` (gh CLI)

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::ConfigError;

/// Get a GitHub token, preferring the configured one.
pub fn resolve_github_token(configured: Option<&str>) -> Result<String, ConfigError> {
    resolve_github_token_with(configured, get_token_from_gh_cli)
}

fn resolve_github_token_with<F>(configured: Option<&str>, gh_cli: F) -> Result<String, ConfigError>
where
    F: FnOnce() -> Option<String>,
{
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("Using GitHub token from config file");
        return Ok(token.to_string());
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var)
            && !token.trim().is_empty()
        {
            debug!("Using GitHub token from {}", var);
            return Ok(token.trim().to_string());
        }
    }

    if let Some(token) = gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    Err(ConfigError::MissingGitHubToken)
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_configured_token_wins() {
        temp_env::with_var("GITHUB_TOKEN", Some("from_env"), || {
            let token = resolve_github_token_with(Some("DUMMY_TOKEN"), || None).unwrap();
            assert_eq!(token, "DUMMY_TOKEN");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_github_token_env_fallback() {
        temp_env::with_vars(
            [("GITHUB_TOKEN", Some("from_github_token")), ("GH_TOKEN", Some("from_gh_token"))],
            || {
                let token = resolve_github_token_with(None, || None).unwrap();
                assert_eq!(token, "from_github_token");
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_gh_token_env_fallback() {
        temp_env::with_vars(
            [("GITHUB_TOKEN", Some("")), ("GH_TOKEN", Some("from_gh_token"))],
            || {
                let token = resolve_github_token_with(Some(" "), || None).unwrap();
                assert_eq!(token, "from_gh_token");
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_gh_cli_is_last_resort() {
        temp_env::with_vars_unset(["GITHUB_TOKEN", "GH_TOKEN"], || {
            let token = resolve_github_token_with(None, || Some("from_cli".into())).unwrap();
            assert_eq!(token, "from_cli");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_no_token_anywhere() {
        temp_env::with_vars_unset(["GITHUB_TOKEN", "GH_TOKEN"], || {
            let result = resolve_github_token_with(None, || None);
            assert!(matches!(result, Err(ConfigError::MissingGitHubToken)));
        });
    }
}
