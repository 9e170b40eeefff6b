//! # contract: the LLM collaborator interface
//!
//! Every downstream feature talks to a language model through the single
//! [`LlmClient`] trait: one system prompt, one user text, one text answer.
//! Provider-specific request and response shapes live in implementors
//! (see the `legacy-lens` crate for the HTTP client), never here.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests in this crate and in
//!   dependents (with the `test-export-mocks` feature) can use `MockLlmClient`.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced a usable HTTP response.
    #[error("LLM transport error: {0}")]
    Transport(String),
    /// The provider answered with an error payload or status.
    #[error("LLM API error: {0}")]
    Api(String),
    /// The provider answered, but the body had no completion text.
    #[error("LLM response had no content")]
    MissingContent,
}

/// Sends one prompt pair to a language model and returns its text answer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError>;
}
