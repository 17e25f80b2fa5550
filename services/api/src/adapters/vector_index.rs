//! services/api/src/adapters/vector_index.rs
//!
//! Implements the `VectorIndexService` port against a Pinecone-style REST data
//! plane (`/vectors/upsert` and `/query`).

use async_trait::async_trait;
use carefinder_core::domain::{AgencyMetadata, VectorMatch, VectorRecord};
use carefinder_core::ports::{PortError, PortResult, VectorIndexService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upserts are sent in chunks of this many vectors.
const UPSERT_BATCH_SIZE: usize = 100;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    area: String,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    rating: f64,
}

impl From<&AgencyMetadata> for WireMetadata {
    fn from(m: &AgencyMetadata) -> Self {
        Self {
            name: m.name.clone(),
            area: m.area.clone(),
            services: m.services.clone(),
            rating: m.rating,
        }
    }
}

impl From<WireMetadata> for AgencyMetadata {
    fn from(m: WireMetadata) -> Self {
        Self {
            name: m.name,
            area: m.area,
            services: m.services,
            rating: m.rating,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: WireMetadata,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<WireVector<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<WireMetadata>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A client for one hosted vector index.
#[derive(Clone)]
pub struct PineconeAdapter {
    client: Client,
    host: String,
    api_key: String,
    index_name: String,
}

impl PineconeAdapter {
    pub fn new(host: &str, api_key: String, index_name: String) -> Self {
        Self {
            client: Client::new(),
            host: normalize_host(host),
            api_key,
            index_name,
        }
    }

    async fn post<B: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> PortResult<R> {
        let url = format!("{}{}", self.host, path);
        debug!("Calling vector index {}: {}", self.index_name, url);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PortError::Unexpected(format!(
                "Vector index {} returned {}: {}",
                self.index_name, status, error_text
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// Adds an `https://` scheme when the host is given bare and drops any trailing slash.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

//=========================================================================================
// `VectorIndexService` Trait Implementation
//=========================================================================================

#[async_trait]
impl VectorIndexService for PineconeAdapter {
    async fn upsert(&self, records: Vec<VectorRecord>) -> PortResult<usize> {
        let mut total = 0;
        for chunk in records.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest {
                vectors: chunk
                    .iter()
                    .map(|r| WireVector {
                        id: &r.id,
                        values: &r.values,
                        metadata: WireMetadata::from(&r.metadata),
                    })
                    .collect(),
            };
            let response: UpsertResponse = self.post("/vectors/upsert", &request).await?;
            total += response.upserted_count;
        }
        info!("Upserted {} vectors into {}", total, self.index_name);
        Ok(total)
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> PortResult<Vec<VectorMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let response: QueryResponse = self.post("/query", &request).await?;
        Ok(response
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.map(AgencyMetadata::from),
            })
            .collect())
    }
}
