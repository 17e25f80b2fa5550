//! services/api/src/startup.rs
//!
//! Wiring shared by the binaries: logging, the database pool and the adapters
//! behind each port.

use crate::adapters::{
    ClientPool, DbAdapter, FileCatalogAdapter, OpenAiEmbeddingAdapter, OpenAiGenerationAdapter,
    OpenAiTitleAdapter, PineconeAdapter,
};
use crate::config::{CatalogSource, Config};
use crate::error::ApiError;
use crate::web::AppState;
use carefinder_core::ports::AgencyCatalog;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber at the configured level.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connects to Postgres and applies the embedded migrations.
pub async fn connect_database(config: &Config) -> Result<Arc<DbAdapter>, ApiError> {
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");
    Ok(db_adapter)
}

/// Picks the catalog source named in the configuration.
pub fn build_catalog(config: &Config, db: Arc<DbAdapter>) -> Arc<dyn AgencyCatalog> {
    match config.catalog_source {
        CatalogSource::Database => db as Arc<dyn AgencyCatalog>,
        CatalogSource::File => {
            info!("Serving agencies from {}", config.agencies_file.display());
            Arc::new(FileCatalogAdapter::new(config.agencies_file.clone()))
        }
    }
}

/// Builds the key-rotating client pool for the generative API.
pub fn build_client_pool(config: &Config) -> Result<ClientPool, ApiError> {
    let pool = ClientPool::new(&config.generation_api_base, &config.generation_api_keys)?;
    info!("Generative API configured with {} key(s)", pool.len());
    Ok(pool)
}

pub fn build_vector_index(config: &Config) -> PineconeAdapter {
    PineconeAdapter::new(
        &config.vector_index_host,
        config.vector_index_api_key.clone(),
        config.vector_index_name.clone(),
    )
}

/// Assembles every adapter into the shared application state.
pub fn build_state(config: Arc<Config>, db: Arc<DbAdapter>) -> Result<AppState, ApiError> {
    let pool = build_client_pool(&config)?;

    Ok(AppState {
        catalog: build_catalog(&config, db.clone()),
        db,
        embedder: Arc::new(OpenAiEmbeddingAdapter::new(
            pool.clone(),
            config.embedding_model.clone(),
        )),
        vector_index: Arc::new(build_vector_index(&config)),
        generator: Arc::new(OpenAiGenerationAdapter::new(
            pool.clone(),
            config.chat_model.clone(),
            config.vision_model.clone(),
        )),
        title_adapter: Arc::new(OpenAiTitleAdapter::new(pool, config.title_model.clone())),
        config,
    })
}
