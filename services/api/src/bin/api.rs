//! services/api/src/bin/api.rs

use api_lib::{
    config::Config,
    error::ApiError,
    startup::{build_state, connect_database, init_tracing},
    web::create_app,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    init_tracing(&config);
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    let db_adapter = connect_database(&config).await?;

    // --- 3. Initialize Service Adapters & Build the Shared AppState ---
    let app_state = Arc::new(build_state(config.clone(), db_adapter)?);
    info!(
        "Catalog source: {:?}, vector index: {}",
        config.catalog_source, config.vector_index_name
    );

    // --- 4. Create the Web Router ---
    let app = create_app(app_state);

    // --- 5. Start the Server ---
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received.");
        signal_token.cancel();
    });

    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped.");
    Ok(())
}
