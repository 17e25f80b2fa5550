//! services/api/src/web/router.rs
//!
//! Builds the axum router shared by the server binary and the integration tests.

use crate::web::{
    audit::audit_image_handler,
    chat::{chat_handler, get_conversation_handler, history_handler},
    profile::{get_profile_handler, upsert_profile_handler},
    rest::{list_agencies_handler, seed_vectors_handler, ApiDoc},
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room photos arrive as base64 inside JSON.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    if allowed_origin == "*" {
        return base.allow_origin(Any);
    }
    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", allowed_origin, e);
            base.allow_origin(Any)
        }
    }
}

/// Creates the full application: API routes, CORS, tracing and Swagger UI.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.config.cors_allowed_origin);

    let api_router = Router::new()
        .route(
            "/api/user/profile",
            post(upsert_profile_handler).get(get_profile_handler),
        )
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/history", get(history_handler))
        .route("/api/chat/{conversation_id}", get(get_conversation_handler))
        .route("/api/audit-image", post(audit_image_handler))
        .route("/api/agencies", get(list_agencies_handler))
        .route("/api/seed-vectors", post(seed_vectors_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
