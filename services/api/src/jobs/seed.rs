//! services/api/src/jobs/seed.rs
//!
//! Re-embeds the whole agency catalog and upserts it into the vector index.

use carefinder_core::domain::VectorRecord;
use carefinder_core::ports::{AgencyCatalog, EmbeddingService, PortError, VectorIndexService};
use carefinder_core::PortResult;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

/// Outcome of one seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub agencies: usize,
    pub upserted: usize,
}

/// Embeds every agency in order, then upserts all vectors keyed by agency id.
///
/// The first failure aborts the run; nothing is upserted unless every embedding succeeded.
pub async fn seed_vectors(
    catalog: &dyn AgencyCatalog,
    embedder: &dyn EmbeddingService,
    index: &dyn VectorIndexService,
) -> PortResult<SeedReport> {
    let agencies = catalog.list_agencies().await?;
    info!("Seeding vector index with {} agencies", agencies.len());

    let records: Vec<VectorRecord> = stream::iter(agencies.iter())
        .then(|agency| async move {
            let values = embedder.embed(&agency.description()).await?;
            Ok::<_, PortError>(VectorRecord {
                id: agency.id.clone(),
                values,
                metadata: agency.metadata(),
            })
        })
        .try_collect()
        .await?;

    let upserted = if records.is_empty() {
        0
    } else {
        index.upsert(records).await?
    };

    info!("Seeding complete: {} agencies, {} vectors upserted", agencies.len(), upserted);
    Ok(SeedReport {
        agencies: agencies.len(),
        upserted,
    })
}
