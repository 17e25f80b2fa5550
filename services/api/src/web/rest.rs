//! services/api/src/web/rest.rs
//!
//! Catalog and seeding endpoints, and the root of the OpenAPI document.

use crate::error::{internal_error, HandlerError};
use crate::jobs::seed_vectors;
use crate::web::{audit, chat, profile, state::AppState};
use axum::{extract::State, response::Json};
use carefinder_core::domain::Agency;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        profile::upsert_profile_handler,
        profile::get_profile_handler,
        chat::chat_handler,
        chat::history_handler,
        chat::get_conversation_handler,
        audit::audit_image_handler,
        list_agencies_handler,
        seed_vectors_handler,
    ),
    components(
        schemas(
            profile::ProfileRequest,
            profile::ProfileResponse,
            chat::ChatRequest,
            chat::ChatResponse,
            chat::HistoryResponse,
            chat::ConversationSummaryResponse,
            chat::ConversationResponse,
            chat::ExchangeResponse,
            crate::reply::Recommendation,
            audit::AuditRequest,
            audit::AuditResponse,
            AgencyResponse,
            LocationResponse,
            SeedResponse,
        )
    ),
    tags(
        (name = "CareFinder API", description = "Elder-care agency search, profiles and home-safety audits.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub city: String,
    pub area: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgencyResponse {
    pub id: String,
    pub name: String,
    pub location: LocationResponse,
    pub services: Vec<String>,
    pub rating: f64,
    pub contact: String,
    pub policy: String,
}

impl From<Agency> for AgencyResponse {
    fn from(a: Agency) -> Self {
        Self {
            id: a.id,
            name: a.name,
            location: LocationResponse {
                city: a.location.city,
                area: a.location.area,
            },
            services: a.services,
            rating: a.rating,
            contact: a.contact,
            policy: a.policy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// GET /api/agencies - The full catalog, unfiltered
#[utoipa::path(
    get,
    path = "/api/agencies",
    responses(
        (status = 200, description = "Every agency in the catalog", body = [AgencyResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_agencies_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AgencyResponse>>, HandlerError> {
    let agencies = state
        .catalog
        .list_agencies()
        .await
        .map_err(|e| internal_error("Failed to load agencies", e))?;
    Ok(Json(agencies.into_iter().map(Into::into).collect()))
}

/// POST /api/seed-vectors - Re-embed the catalog into the vector index
#[utoipa::path(
    post,
    path = "/api/seed-vectors",
    responses(
        (status = 200, description = "Every agency was embedded and upserted", body = SeedResponse),
        (status = 500, description = "Seeding aborted")
    )
)]
pub async fn seed_vectors_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeedResponse>, HandlerError> {
    let report = seed_vectors(
        state.catalog.as_ref(),
        state.embedder.as_ref(),
        state.vector_index.as_ref(),
    )
    .await
    .map_err(|e| internal_error("Failed to seed vectors", e))?;

    info!("Seeded {} agencies", report.agencies);
    Ok(Json(SeedResponse {
        message: format!("Seeded {} agencies into the vector index", report.agencies),
        count: report.agencies,
    }))
}
