//! services/api/src/bin/import_agencies.rs
//!
//! Loads a JSON agency catalog into the database, replacing what is there.
//!
//! Usage: `import_agencies [path]`. Defaults to `AGENCIES_FILE`.

use api_lib::{
    config::Config,
    error::ApiError,
    jobs::import_agencies,
    startup::{connect_database, init_tracing},
};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.agencies_file.clone());

    let db_adapter = connect_database(&config).await?;
    let imported = import_agencies(db_adapter.as_ref(), &path).await?;
    info!("Imported {} agencies from {}", imported, path.display());
    Ok(())
}
