//! OpenAI client configuration with sensible defaults.

use crate::error::{LoreError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with the configured timeout.
///
/// When `api_key` is `None` the client falls back to `OPENAI_API_KEY`.
pub fn create_client(api_key: Option<&str>) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = match api_key {
        Some(key) if !key.is_empty() => OpenAIConfig::new().with_api_key(key),
        _ => OpenAIConfig::default(),
    };

    Ok(Client::with_config(config).with_http_client(http_client))
}
