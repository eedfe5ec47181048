//! Text generation: provider client and output cleaning.

pub mod clean;
pub mod gemini;

pub use clean::clean_llm_output;
pub use gemini::GeminiClient;

use async_trait::async_trait;
use tracing::debug;

use crate::error::LlmError;
use crate::prompt::GenerationRequest;

/// Trait for sending a prompt pair to a text-generation service.
///
/// This abstraction allows mocking the provider in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the system and user prompts and return the raw response text.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

/// Generate text for `request` and strip markdown fencing from the result.
///
/// Fails with [`LlmError::EmptyResponse`] when nothing usable is left after cleaning.
pub async fn generate_message<G>(generator: &G, request: &GenerationRequest) -> Result<String, LlmError>
where
    G: TextGenerator + ?Sized,
{
    debug!(
        "Generating with system prompt of {} chars and user prompt of {} chars",
        request.system_prompt.len(),
        request.user_prompt.len()
    );

    let raw = generator
        .generate(&request.system_prompt, &request.user_prompt)
        .await?;

    let cleaned = clean_llm_output(&raw);
    if cleaned.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(cleaned)
}
