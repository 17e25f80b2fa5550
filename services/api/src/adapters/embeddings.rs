//! services/api/src/adapters/embeddings.rs
//!
//! Implements the `EmbeddingService` port with the embeddings endpoint of the
//! OpenAI-compatible generative API.

use async_openai::{error::OpenAIError, types::CreateEmbeddingRequestArgs};
use async_trait::async_trait;
use carefinder_core::ports::{EmbeddingService, PortError, PortResult};

use super::client_pool::ClientPool;

#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    pool: ClientPool,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    pub fn new(pool: ClientPool, model: String) -> Self {
        Self { pool, model }
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    /// Embeds the text exactly as given.
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text.to_string())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .pool
            .pick()?
            .embeddings()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| PortError::Unexpected("Embedding response contained no vectors.".to_string()))
    }
}
