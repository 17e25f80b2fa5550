//! services/api/src/adapters/catalog_file.rs
//!
//! A read-only agency catalog backed by a static JSON file. The same file format
//! feeds the `import_agencies` loader.

use async_trait::async_trait;
use carefinder_core::domain::{Agency, AgencyLocation};
use carefinder_core::ports::{AgencyCatalog, PortError, PortResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    location: CatalogLocation,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    contact: String,
    #[serde(default)]
    policy: String,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogLocation {
    #[serde(default)]
    city: String,
    #[serde(default)]
    area: String,
}

impl CatalogEntry {
    fn to_domain(self) -> Agency {
        Agency {
            id: self.id,
            name: self.name,
            location: AgencyLocation {
                city: self.location.city,
                area: self.location.area,
            },
            services: self.services,
            rating: self.rating,
            contact: self.contact,
            policy: self.policy,
        }
    }
}

/// Parses a JSON array of agencies.
pub fn parse_catalog(json: &str) -> PortResult<Vec<Agency>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)
        .map_err(|e| PortError::InvalidInput(format!("invalid agency catalog: {}", e)))?;
    Ok(entries.into_iter().map(CatalogEntry::to_domain).collect())
}

/// Reads and parses a catalog file.
pub async fn read_catalog(path: &Path) -> PortResult<Vec<Agency>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        PortError::Unexpected(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_catalog(&contents)
}

/// Serves the catalog straight from the file, re-reading it on every call.
#[derive(Clone)]
pub struct FileCatalogAdapter {
    path: PathBuf,
}

impl FileCatalogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl AgencyCatalog for FileCatalogAdapter {
    async fn list_agencies(&self) -> PortResult<Vec<Agency>> {
        read_catalog(&self.path).await
    }
}
