//! Transcript correction through a hosted chat model.

use super::complete;
use crate::config::Prompts;
use crate::error::{LoreError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Corrects a raw speech-to-text transcript, keeping its JSON structure.
#[async_trait]
pub trait TranscriptCleaner: Send + Sync {
    async fn clean(&self, transcript: &serde_json::Value) -> Result<serde_json::Value>;
}

/// Strip a Markdown code fence the model may wrap its JSON in.
pub fn strip_code_fence(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Cleaner backed by the OpenAI chat API.
pub struct OpenAICleaner {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAICleaner {
    pub fn new(api_key: Option<&str>, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            temperature: 0.0,
            prompts: Prompts::default(),
        })
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl TranscriptCleaner for OpenAICleaner {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn clean(&self, transcript: &serde_json::Value) -> Result<serde_json::Value> {
        let system = self
            .prompts
            .render_with_custom(&self.prompts.cleanup.system, &HashMap::new());
        let user = serde_json::to_string(transcript)?;

        let content = complete(
            &self.client,
            &self.model,
            system,
            user,
            self.temperature,
            false,
            LoreError::Cleanup,
        )
        .await?;

        debug!("Cleanup response: {} chars", content.len());

        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| LoreError::Cleanup(format!("Model returned invalid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[{\"text\": \"a\"}]\n```"), "[{\"text\": \"a\"}]");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_response_parses() {
        let response = "```json\n[{\"start\": 0.0, \"text\": \"Kurwinox\"}]\n```";
        let value: serde_json::Value = serde_json::from_str(strip_code_fence(response)).unwrap();
        assert_eq!(value[0]["text"], "Kurwinox");
    }
}
