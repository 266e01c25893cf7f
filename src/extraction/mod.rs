//! Hosted-model stages that run before indexing: transcript cleanup and
//! structured lore extraction.

mod cleanup;
mod extractor;
pub mod filename;

pub use cleanup::{strip_code_fence, OpenAICleaner, TranscriptCleaner};
pub use extractor::{LoreExtractor, OpenAIExtractor};
pub use filename::{parse_episode_filename, EpisodeHint};

use crate::error::{LoreError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;

/// One system + user chat completion returning the first choice's text.
///
/// Request-building and empty-response failures are reported through `err`
/// so each stage keeps its own error variant.
pub(crate) async fn complete(
    client: &Client<OpenAIConfig>,
    model: &str,
    system: String,
    user: String,
    temperature: f32,
    json_mode: bool,
    err: fn(String) -> LoreError,
) -> Result<String> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|e| err(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(|e| err(e.to_string()))?
            .into(),
    ];

    let mut request = CreateChatCompletionRequestArgs::default();
    request.model(model).messages(messages).temperature(temperature);
    if json_mode {
        request.response_format(ResponseFormat::JsonObject);
    }
    let request = request.build().map_err(|e| err(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| LoreError::OpenAI(format!("Chat completion failed: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| err("Empty response from model".to_string()))
}
