//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use carefinder_core::ports::{
    AgencyCatalog, DatabaseService, EmbeddingService, GenerationService, TitleGenerationService,
    VectorIndexService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Handlers never mutate it; each request works only through the ports.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub catalog: Arc<dyn AgencyCatalog>,
    pub config: Arc<Config>,
    pub embedder: Arc<dyn EmbeddingService>,
    pub vector_index: Arc<dyn VectorIndexService>,
    pub generator: Arc<dyn GenerationService>,
    pub title_adapter: Arc<dyn TitleGenerationService>,
}
