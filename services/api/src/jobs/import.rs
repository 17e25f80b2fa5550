//! services/api/src/jobs/import.rs
//!
//! Replaces the stored agency catalog with the contents of a static JSON file.

use carefinder_core::ports::{DatabaseService, PortResult};
use std::path::Path;
use tracing::info;

use crate::adapters::catalog_file::read_catalog;

/// Loads `path` and swaps it in as the whole catalog. Returns the number of agencies stored.
pub async fn import_agencies(db: &dyn DatabaseService, path: &Path) -> PortResult<usize> {
    let agencies = read_catalog(path).await?;
    info!("Importing {} agencies from {}", agencies.len(), path.display());
    db.replace_agencies(agencies).await
}
