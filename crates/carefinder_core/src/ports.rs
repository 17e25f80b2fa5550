//! crates/carefinder_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The database, the vector index and the generative API are all reached through
//! these traits so the request handlers never depend on a concrete client.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Agency, Conversation, ConversationSummary, Exchange, InlineImage, ProfileUpdate, UserProfile,
    VectorMatch, VectorRecord,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Profiles ---
    async fn get_profile(&self, email: &str) -> PortResult<UserProfile>;

    /// Creates or updates the profile keyed by `update.email`.
    async fn upsert_profile(&self, update: ProfileUpdate) -> PortResult<UserProfile>;

    // --- Agencies ---
    async fn list_agencies(&self) -> PortResult<Vec<Agency>>;

    /// Replaces the whole catalog. Returns the number of stored agencies.
    async fn replace_agencies(&self, agencies: Vec<Agency>) -> PortResult<usize>;

    // --- Conversations ---
    async fn get_conversation(&self, conversation_id: Uuid) -> PortResult<Conversation>;

    async fn create_conversation(
        &self,
        user_email: &str,
        title: &str,
        exchanges: Vec<Exchange>,
    ) -> PortResult<Conversation>;

    /// Appends exchanges in order. A `Some` title replaces the stored one.
    async fn append_exchanges(
        &self,
        conversation_id: Uuid,
        exchanges: Vec<Exchange>,
        title: Option<String>,
    ) -> PortResult<()>;

    /// One page of a user's conversations, most recently updated first. `page` starts at 1.
    async fn list_conversations(
        &self,
        user_email: &str,
        page: u32,
        limit: u32,
    ) -> PortResult<Vec<ConversationSummary>>;
}

/// Read access to the agency catalog, wherever it is stored.
#[async_trait]
pub trait AgencyCatalog: Send + Sync {
    async fn list_agencies(&self) -> PortResult<Vec<Agency>>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Maps a text to a fixed-length vector.
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>>;
}

#[async_trait]
pub trait VectorIndexService: Send + Sync {
    /// Inserts or overwrites records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> PortResult<usize>;

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> PortResult<Vec<VectorMatch>>;
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> PortResult<String>;

    /// Generates text for a prompt with an image attached inline.
    async fn generate_with_image(&self, prompt: &str, image: &InlineImage) -> PortResult<String>;
}

#[async_trait]
pub trait TitleGenerationService: Send + Sync {
    /// Produces a short conversation title from the opening exchange.
    async fn generate_title(&self, text: &str) -> PortResult<String>;
}
