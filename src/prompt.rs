//! Prompt assembly from the configured templates.
//!
//! The user template may reference `{diff}` and, for amends,
//! `{previous_message}`. Anything a template does not reference is appended
//! as a labelled section, so the model always receives the diff.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Placeholder replaced with the diff text.
pub const DIFF_PLACEHOLDER: &str = "{diff}";

/// Placeholder replaced with the message of the commit being amended.
pub const PREVIOUS_MESSAGE_PLACEHOLDER: &str = "{previous_message}";

/// The prompt pair sent to the text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// A system template and a user template for one workflow.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub system: String,
    pub user: String,
}

impl PromptTemplates {
    /// Read both templates from disk.
    pub fn load(system_path: &Path, user_path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            system: read_template(system_path)?,
            user: read_template(user_path)?,
        })
    }

    /// Build the request for a commit message.
    ///
    /// With `previous_message` set (amend), the prior message is included so
    /// the model revises it rather than drafting from scratch.
    pub fn commit_request(&self, diff: &str, previous_message: Option<&str>) -> GenerationRequest {
        let mut substitutions = vec![Substitution {
            placeholder: DIFF_PLACEHOLDER,
            label: "Diff",
            value: diff,
        }];
        if let Some(previous) = previous_message {
            substitutions.push(Substitution {
                placeholder: PREVIOUS_MESSAGE_PLACEHOLDER,
                label: "Previous commit message",
                value: previous,
            });
        }

        GenerationRequest {
            system_prompt: self.system.clone(),
            user_prompt: render(&self.user, &substitutions),
        }
    }

    /// Build the request for a pull-request title and body.
    pub fn pull_request_request(&self, diff: &str) -> GenerationRequest {
        let substitutions = [Substitution {
            placeholder: DIFF_PLACEHOLDER,
            label: "Diff",
            value: diff,
        }];

        GenerationRequest {
            system_prompt: self.system.clone(),
            user_prompt: render(&self.user, &substitutions),
        }
    }
}

fn read_template(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::TemplateUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

struct Substitution<'a> {
    placeholder: &'static str,
    label: &'static str,
    value: &'a str,
}

/// Replace placeholders in a single pass, then append unreferenced values.
///
/// Single-pass replacement keeps placeholder-looking text inside the diff or
/// the previous message from being substituted again.
fn render(template: &str, substitutions: &[Substitution<'_>]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut used = vec![false; substitutions.len()];
    let mut rest = template;

    loop {
        let next = substitutions
            .iter()
            .enumerate()
            .filter_map(|(i, s)| rest.find(s.placeholder).map(|pos| (pos, i)))
            .min();

        let Some((pos, i)) = next else {
            output.push_str(rest);
            break;
        };

        let substitution = &substitutions[i];
        output.push_str(&rest[..pos]);
        output.push_str(substitution.value);
        used[i] = true;
        rest = &rest[pos + substitution.placeholder.len()..];
    }

    // Previous message reads better before the diff it is revised against.
    for (substitution, _) in substitutions
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .rev()
    {
        if !output.trim().is_empty() {
            output.truncate(output.trim_end().len());
            output.push_str("\n\n");
        } else {
            output.clear();
        }
        output.push_str(substitution.label);
        output.push_str(":\n");
        output.push_str(substitution.value);
    }

    output
}
