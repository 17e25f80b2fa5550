//! services/api/src/web/audit.rs
//!
//! The image-based home-safety audit endpoint.

use crate::error::{bad_request, internal_error, HandlerError};
use crate::prompts::build_audit_prompt;
use crate::reply::{split_data_uri, strip_code_fences};
use crate::web::chat_task::resolve_profile;
use crate::web::profile::required_email;
use crate::web::state::AppState;
use axum::{extract::State, response::Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use carefinder_core::domain::InlineImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

const DEFAULT_ROOM_TYPE: &str = "General";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditRequest {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, rename = "roomType")]
    pub room_type: Option<String>,
    /// Raw base64 or a `data:` URL.
    #[serde(default, rename = "imageBase64")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditResponse {
    /// The model's JSON report, as text. Clients parse it themselves.
    pub audit_report: String,
}

/// POST /api/audit-image - Audit a room photo for fall and accessibility hazards
#[utoipa::path(
    post,
    path = "/api/audit-image",
    request_body = AuditRequest,
    responses(
        (status = 200, description = "Audit report as an embedded JSON string", body = AuditResponse),
        (status = 400, description = "user_email or imageBase64 missing or invalid"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn audit_image_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, HandlerError> {
    let user_email =
        required_email(req.user_email.as_deref()).ok_or_else(|| bad_request("user_email is required"))?;
    let payload = req
        .image_base64
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| bad_request("imageBase64 is required"))?;

    let (mime_type, data) = split_data_uri(&payload);
    let decoded = STANDARD
        .decode(data)
        .map_err(|_| bad_request("imageBase64 is not valid base64"))?;
    if decoded.is_empty() {
        return Err(bad_request("imageBase64 is required"));
    }

    let room_type = req
        .room_type
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_ROOM_TYPE.to_string());

    let start_time = Instant::now();
    let profile = resolve_profile(&state, &user_email)
        .await
        .map_err(|e| internal_error("Failed to audit image", e))?;

    let prompt = build_audit_prompt(&room_type, profile.as_ref());
    let image = InlineImage {
        mime_type,
        base64_data: data.to_string(),
    };

    let raw_report = state
        .generator
        .generate_with_image(&prompt, &image)
        .await
        .map_err(|e| internal_error("Failed to audit image", e))?;

    info!(
        "Audit of {} ({} bytes) for {} took {:?}",
        room_type,
        decoded.len(),
        user_email,
        start_time.elapsed()
    );

    Ok(Json(AuditResponse {
        audit_report: strip_code_fences(&raw_report),
    }))
}
