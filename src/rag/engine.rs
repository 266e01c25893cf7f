//! RAG response generation.

use super::{assemble, AssembledContext, RetrievedChunk, TokenBudget};
use crate::config::{Prompts, RetrievalConfig};
use crate::embedding::Embedder;
use crate::error::{LoreError, Result};
use crate::openai::create_client;
use crate::tokenizer::Tokenizer;
use crate::vector_store::VectorStore;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Produces an answer from a system prompt and a rendered user prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}

/// Generator backed by the OpenAI chat API.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGenerator {
    pub fn new(api_key: Option<&str>, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 256,
        })
    }

    /// Set sampling temperature and answer length.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| LoreError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| LoreError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| LoreError::Rag(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LoreError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LoreError::Rag("Empty response from LLM".to_string()))
    }
}

/// Text after the first `marker`, or the whole output when the model did not
/// echo the template.
pub fn extract_answer(output: &str, marker: &str) -> String {
    if marker.is_empty() {
        return output.trim().to_string();
    }
    match output.split(marker).nth(1) {
        Some(answer) => answer.trim().to_string(),
        None => output.trim().to_string(),
    }
}

/// An answer with the context it was generated from.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// The generated answer.
    pub answer: String,
    /// Context passed to the model.
    pub context: AssembledContext,
    /// Retrieved chunks, best first.
    pub sources: Vec<RetrievedChunk>,
}

/// RAG engine for question answering.
pub struct RagEngine {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    tokenizer: Arc<dyn Tokenizer>,
    generator: Arc<dyn Generator>,
    config: RetrievalConfig,
    prompts: Prompts,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        tokenizer: Arc<dyn Tokenizer>,
        generator: Arc<dyn Generator>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            tokenizer,
            generator,
            config,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Override the number of fragments retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.config.similarity_top_k = top_k.max(1);
        self
    }

    /// Override the context token budget, keeping the minimum fragment size.
    pub fn with_token_budget(mut self, total: usize) -> Result<Self> {
        self.config.budget = TokenBudget::new(total, self.config.budget.min_fragment_tokens)?;
        Ok(self)
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Embed the question and return the best matching fragments.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .vector_store
            .search_with_threshold(
                &query_embedding,
                self.config.similarity_top_k,
                self.config.min_score,
            )
            .await?;

        debug!("Retrieved {} fragments", results.len());
        Ok(RetrievedChunk::from_results(results))
    }

    /// Retrieve fragments and fit them into the token budget.
    pub async fn build_context(
        &self,
        question: &str,
    ) -> Result<(Vec<RetrievedChunk>, AssembledContext)> {
        let chunks = self.retrieve(question).await?;
        let context = assemble(&chunks, &self.config.budget, self.tokenizer.as_ref())?;
        Ok((chunks, context))
    }

    /// Render the user prompt for a question and its context.
    pub fn render_prompt(&self, question: &str, context: &AssembledContext) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.text.clone());
        self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
    }

    /// Answer a question from the knowledge base.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<RagAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(LoreError::InvalidInput("Question is empty".to_string()));
        }

        info!("Processing question: {}", question);

        let (sources, context) = self.build_context(question).await?;
        if context.is_empty() {
            debug!("No context fits the budget, answering without lore");
        }

        let system = self
            .prompts
            .render_with_custom(&self.prompts.rag.system, &HashMap::new());
        let user = self.render_prompt(question, &context);

        let output = self.generator.generate(&system, &user).await?;
        let answer = extract_answer(&output, &self.prompts.rag.answer_marker);

        debug!(
            "Generated answer from {} fragments ({} tokens of context)",
            context.chunks_included, context.used_tokens
        );

        Ok(RagAnswer {
            answer,
            context,
            sources,
        })
    }
}
