//! Structured lore extraction through a hosted chat model in JSON mode.

use super::{complete, EpisodeHint};
use crate::config::Prompts;
use crate::error::{LoreError, Result};
use crate::openai::create_client;
use crate::record::{record_from_value, EpisodeRecord};
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Turns a cleaned transcript into an [`EpisodeRecord`].
#[async_trait]
pub trait LoreExtractor: Send + Sync {
    async fn extract(&self, transcript: &serde_json::Value, hint: &EpisodeHint)
        -> Result<EpisodeRecord>;
}

/// Parse the model's JSON and pin the episode identity to the file name.
///
/// A response that does not fit the record schema is an extraction failure,
/// so the batch driver may ask again.
pub(crate) fn record_from_response(content: &str, hint: &EpisodeHint) -> Result<EpisodeRecord> {
    let invalid = |e: LoreError| LoreError::Extraction(format!("Model returned an invalid record: {}", e));

    let mut value: serde_json::Value = serde_json::from_str(content).map_err(|e| invalid(e.into()))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| LoreError::Extraction("Model response is not a JSON object".to_string()))?;
    object.insert("episode_id".to_string(), hint.episode_id.clone().into());
    object.insert("title".to_string(), hint.title.clone().into());

    record_from_value(value, &hint.source_file).map_err(invalid)
}

/// Extractor backed by the OpenAI chat API.
pub struct OpenAIExtractor {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAIExtractor {
    pub fn new(api_key: Option<&str>, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            temperature: 0.2,
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
impl LoreExtractor for OpenAIExtractor {
    #[instrument(skip_all, fields(episode = %hint.episode_id))]
    async fn extract(
        &self,
        transcript: &serde_json::Value,
        hint: &EpisodeHint,
    ) -> Result<EpisodeRecord> {
        let system = self
            .prompts
            .render_with_custom(&self.prompts.extraction.system, &HashMap::new());
        let user = serde_json::to_string(transcript)?;

        let content = complete(
            &self.client,
            &self.model,
            system,
            user,
            self.temperature,
            true,
            LoreError::Extraction,
        )
        .await?;

        debug!("Extraction response: {} chars", content.len());
        record_from_response(&content, hint)
    }
}
