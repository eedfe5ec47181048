//! External editor sessions for revising generated text.

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::EditorError;

/// Editors tried, in order, when nothing else is configured.
const FALLBACK_EDITORS: [&str; 2] = ["vi", "nano"];

/// Trait for letting the user edit a piece of text.
///
/// This abstraction allows substituting the editor in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Editor {
    /// Open `initial` for editing and return the saved result.
    fn edit(&self, initial: &str) -> Result<String, EditorError>;
}

/// Pick the editor command.
///
/// Priority: configured command, `git config core.editor`, `$VISUAL`,
/// `$EDITOR`, then the first fallback editor found on `PATH` (`vi` if none).
pub fn resolve_editor(configured: Option<&str>) -> String {
    resolve_editor_with(configured, git_core_editor)
}

fn resolve_editor_with<F>(configured: Option<&str>, git_lookup: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    if let Some(command) = configured.map(str::trim).filter(|c| !c.is_empty()) {
        return command.to_string();
    }

    if let Some(command) = git_lookup() {
        return command;
    }

    for var in ["VISUAL", "EDITOR"] {
        if let Ok(value) = env::var(var)
            && !value.trim().is_empty()
        {
            return value.trim().to_string();
        }
    }

    FALLBACK_EDITORS
        .iter()
        .find(|candidate| which::which(candidate).is_ok())
        .unwrap_or(&FALLBACK_EDITORS[0])
        .to_string()
}

/// Read `core.editor` from git's configuration.
fn git_core_editor() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "core.editor"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// An editor launched as a child process on a scratch file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Build an editor from the configured command, falling back as
    /// described in [`resolve_editor`].
    pub fn from_config(configured: Option<&str>) -> Self {
        Self::new(resolve_editor(configured))
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, initial: &str) -> Result<String, EditorError> {
        if self.command.trim().is_empty() {
            return Err(EditorError::EmptyCommand);
        }

        // The scratch file is deleted when `file` drops, on every path out of here.
        let mut file = tempfile::Builder::new()
            .prefix("quill-")
            .suffix(".md")
            .tempfile()
            .map_err(EditorError::ScratchFile)?;
        file.write_all(initial.as_bytes())
            .and_then(|()| file.flush())
            .map_err(EditorError::ScratchFile)?;

        debug!("Launching editor '{}' on {}", self.command, file.path().display());

        let status = editor_command(&self.command, file.path())
            .status()
            .map_err(|source| EditorError::SpawnFailed {
                editor: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::NonZeroExit {
                editor: self.command.clone(),
                code: status.code(),
            });
        }

        // Read by path: many editors replace the file instead of writing in place.
        fs::read_to_string(file.path()).map_err(EditorError::ScratchFile)
    }
}

/// Run the editor through the shell, as git does, so commands with
/// arguments or quoting (`code --wait`) work.
#[cfg(unix)]
fn editor_command(editor: &str, path: &Path) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(format!("{editor} \"$@\""))
        .arg(editor)
        .arg(path);
    command
}

#[cfg(not(unix))]
fn editor_command(editor: &str, path: &Path) -> Command {
    let mut parts = editor.split_whitespace();
    let mut command = Command::new(parts.next().unwrap_or(editor));
    command.args(parts).arg(path);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_editor_wins() {
        let editor = resolve_editor_with(Some("editor_from_config"), || {
            panic!("git should not be consulted")
        });
        assert_eq!(editor, "editor_from_config");
    }

    #[test]
    #[serial_test::serial]
    fn test_git_core_editor_beats_environment() {
        temp_env::with_var("EDITOR", Some("editor_from_env"), || {
            let editor = resolve_editor_with(Some("  "), || Some("editor_from_git".into()));
            assert_eq!(editor, "editor_from_git");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_environment_used_when_git_has_none() {
        temp_env::with_vars(
            [("VISUAL", None), ("EDITOR", Some("editor_from_env"))],
            || {
                let editor = resolve_editor_with(None, || None);
                assert_eq!(editor, "editor_from_env");
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_visual_preferred_over_editor() {
        temp_env::with_vars(
            [("VISUAL", Some("visual_editor")), ("EDITOR", Some("plain_editor"))],
            || {
                assert_eq!(resolve_editor_with(None, || None), "visual_editor");
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_fallback_editor_when_nothing_configured() {
        temp_env::with_vars_unset(["VISUAL", "EDITOR"], || {
            let editor = resolve_editor_with(None, || None);
            assert!(FALLBACK_EDITORS.contains(&editor.as_str()));
        });
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let result = ExternalEditor::new(" ").edit("text");
        assert!(matches!(result, Err(EditorError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[test]
    fn test_noop_editor_returns_initial_text() {
        let edited = ExternalEditor::new("true").edit("feat: keep me").unwrap();
        assert_eq!(edited, "feat: keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_changes_are_read_back() {
        let edited = ExternalEditor::new("printf 'edited message' >")
            .edit("original")
            .unwrap();
        assert_eq!(edited, "edited message");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_still_removes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("scratch-path");
        let command = format!(
            "record() {{ printf %s \"$1\" > '{}'; exit 3; }}; record",
            record.display()
        );

        let result = ExternalEditor::new(command).edit("draft");
        assert!(matches!(
            result,
            Err(EditorError::NonZeroExit { code: Some(3), .. })
        ));

        let scratch = std::fs::read_to_string(&record).unwrap();
        assert!(!scratch.is_empty());
        assert!(!Path::new(&scratch).exists());
    }
}
