//! services/api/src/bin/seed_vectors.rs
//!
//! One-shot job: embeds every agency in the configured catalog and upserts
//! the vectors into the index. Safe to re-run; records are keyed by agency id.

use api_lib::{
    adapters::OpenAiEmbeddingAdapter,
    config::Config,
    error::ApiError,
    jobs::seed_vectors,
    startup::{build_catalog, build_client_pool, build_vector_index, connect_database, init_tracing},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let db_adapter = connect_database(&config).await?;
    let catalog = build_catalog(&config, db_adapter);
    let embedder =
        OpenAiEmbeddingAdapter::new(build_client_pool(&config)?, config.embedding_model.clone());
    let index = build_vector_index(&config);

    let report = seed_vectors(catalog.as_ref(), &embedder, &index).await?;
    info!(
        "Seeding finished: {} agencies, {} vectors upserted into '{}'",
        report.agencies, report.upserted, config.vector_index_name
    );
    Ok(())
}
