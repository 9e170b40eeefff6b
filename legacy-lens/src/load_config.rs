//! Loads the optional YAML configuration file.
//!
//! The file only carries non-secret settings. The LLM API key is read from the
//! environment variable the file names (`llm.api_key_env`), after `dotenvy`
//! has loaded any `.env` file. Every key has a default, so an empty file and a
//! missing `--config` flag both produce [`CliConfig::default`].
//!
//! ```yaml
//! ingest:
//!   pattern_mode: exclude
//!   patterns: ["tests/", "*.md"]
//!   size_position: 250
//! llm:
//!   endpoint: https://api.openai.com/v1/chat/completions
//!   model: gpt-4o-mini
//!   api_key_env: LLM_API_KEY
//! ```

use anyhow::{Context, Result};
use legacy_lens_core::ingest::IngestOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "LLM_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub ingest: IngestOptions,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {path_ref:?}"))?;

    if content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };
    Ok(config)
}

/// Loads `path` when given, otherwise returns the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(CliConfig::default()),
    }
}
