//! HTTP implementation of [`LlmClient`] for OpenAI-compatible chat completion
//! endpoints.
//!
//! One request per call: a system message and a user message go out, the
//! first choice's message content comes back. Nothing is retried.

use crate::load_config::LlmSection;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use legacy_lens_core::contract::{LlmClient, LlmError};
use serde::{Deserialize, Serialize};
use std::env;

pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_http(reqwest::Client::new(), endpoint, model, api_key)
    }

    /// Uses a caller-built `reqwest::Client` (timeouts, proxies).
    pub fn with_http(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a client from the `llm` config section, reading the API key from
    /// the environment variable it names.
    pub fn new_from_config(section: &LlmSection) -> Result<Self> {
        let api_key = env::var(&section.api_key_env).map_err(|e| {
            tracing::error!(error = ?e, var = %section.api_key_env, "LLM API key missing in environment");
            anyhow!(
                "Environment variable {} must hold the LLM API key",
                section.api_key_env
            )
        })?;
        tracing::info!(
            endpoint = %section.endpoint,
            model = %section.model,
            api_key_set = !api_key.is_empty(),
            "Initialized ChatClient from config"
        );
        Ok(Self::new(
            section.endpoint.clone(),
            section.model.clone(),
            api_key,
        ))
    }
}

fn first_content(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(LlmError::MissingContent)
}

#[async_trait]
impl LlmClient for ChatClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
        };
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, endpoint = %self.endpoint, "Chat completion request failed");
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "Chat completion endpoint returned an error");
            return Err(LlmError::Api(format!("{status}: {text}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = ?e, "Chat completion response was not valid JSON");
            LlmError::Api(e.to_string())
        })?;
        let content = first_content(parsed)?;
        tracing::info!(len = content.len(), "Received chat completion");
        Ok(content)
    }
}
