//! services/api/src/adapters/title_llm.rs
//!
//! Adapter for the short-title generation call made when a conversation starts.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use carefinder_core::ports::{PortError, PortResult, TitleGenerationService};

use super::client_pool::ClientPool;
use crate::prompts::TITLE_INSTRUCTIONS;

pub struct OpenAiTitleAdapter {
    pool: ClientPool,
    model: String,
}

impl OpenAiTitleAdapter {
    pub fn new(pool: ClientPool, model: String) -> Self {
        Self { pool, model }
    }
}

#[async_trait]
impl TitleGenerationService for OpenAiTitleAdapter {
    async fn generate_title(&self, text: &str) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(TITLE_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(20u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .pool
            .pick()?
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let title = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("No title generated".to_string()))?;

        Ok(title.trim().to_string())
    }
}
