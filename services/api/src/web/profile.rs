//! services/api/src/web/profile.rs
//!
//! Profile endpoints: upsert by email and lookup by email.

use crate::error::{bad_request, internal_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use carefinder_core::domain::{ProfileUpdate, UserProfile};
use carefinder_core::ports::PortError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Accepts a number or a numeric string.
    #[serde(default, deserialize_with = "lenient_age")]
    #[schema(value_type = Option<i32>)]
    pub age: Option<i32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub name: Option<String>,
    pub profile_pic: Option<String>,
    pub age: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            email: p.email,
            name: p.name,
            profile_pic: p.profile_pic,
            age: p.age,
            phone: p.phone,
            address: p.address,
            medical_history: p.medical_history,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    pub email: Option<String>,
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Age {
        Number(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Age>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Age::Number(n)) => Ok(i32::try_from(n).ok()),
        Some(Age::Float(f)) => Ok(Some(f.round() as i32)),
        Some(Age::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Age::Text(s)) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("age '{}' is not a number", s))),
    }
}

/// Returns the trimmed email, or `None` when it is missing or blank.
pub(crate) fn required_email(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/user/profile - Create or update a profile keyed by email
#[utoipa::path(
    post,
    path = "/api/user/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile stored", body = ProfileResponse),
        (status = 400, description = "email is required"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upsert_profile_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let email = required_email(req.email.as_deref()).ok_or_else(|| bad_request("email is required"))?;

    let update = ProfileUpdate {
        email,
        name: req.name,
        profile_pic: req.profile_pic,
        phone: req.phone,
        age: req.age,
        address: req.address,
        medical_history: req.medical_history,
    };

    let profile = state
        .db
        .upsert_profile(update)
        .await
        .map_err(|e| internal_error("Failed to save profile", e))?;

    info!("Profile saved for {}", profile.email);
    Ok(Json(profile.into()))
}

/// GET /api/user/profile - Fetch a stored profile
#[utoipa::path(
    get,
    path = "/api/user/profile",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Stored profile", body = ProfileResponse),
        (status = 400, description = "email is required"),
        (status = 404, description = "No profile for this email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let email = required_email(query.email.as_deref()).ok_or_else(|| bad_request("email is required"))?;

    match state.db.get_profile(&email).await {
        Ok(profile) => Ok(Json(profile.into())),
        Err(PortError::NotFound(_)) => Err((StatusCode::NOT_FOUND, "Profile not found".to_string())),
        Err(e) => Err(internal_error("Failed to load profile", e)),
    }
}
