//! services/api/src/web/chat.rs
//!
//! Chat endpoints: send a message, list past conversations, fetch one conversation.

use crate::error::{bad_request, internal_error, HandlerError};
use crate::reply::Recommendation;
use crate::web::chat_task::{chat_process, ChatInput};
use crate::web::profile::required_email;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use carefinder_core::domain::{Conversation, ConversationSummary, Exchange};
use carefinder_core::ports::PortError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 50;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Continue this conversation. Unknown or malformed ids start a new one.
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub recommendations: Vec<Recommendation>,
    pub conversation_id: Uuid,
    pub title: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub user_email: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            created_at: s.created_at,
            updated_at: s.updated_at,
            message_count: s.message_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub conversations: Vec<ConversationSummaryResponse>,
    pub page: u32,
    pub limit: u32,
    /// True when a full page came back. More pages may or may not exist.
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResponse {
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Exchange> for ExchangeResponse {
    fn from(e: Exchange) -> Self {
        Self {
            sender: e.role.as_str().to_string(),
            text: e.text,
            timestamp: e.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    #[serde(rename = "user_email")]
    pub user_email: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ExchangeResponse>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            user_email: c.user_email,
            title: c.title,
            created_at: c.created_at,
            updated_at: c.updated_at,
            messages: c.exchanges.into_iter().map(ExchangeResponse::from).collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/chat - Ask the assistant about care agencies
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Generated reply", body = ChatResponse),
        (status = 400, description = "user_email or message missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HandlerError> {
    let user_email =
        required_email(req.user_email.as_deref()).ok_or_else(|| bad_request("user_email is required"))?;
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| bad_request("message is required"))?;
    let conversation_id = req
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .and_then(|id| Uuid::parse_str(id).ok());

    let outcome = chat_process(
        state,
        ChatInput {
            user_email,
            message,
            conversation_id,
        },
    )
    .await
    .map_err(|e| internal_error("Failed to process chat message", e))?;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        recommendations: outcome.recommendations,
        conversation_id: outcome.conversation_id,
        title: outcome.title,
    }))
}

/// GET /api/chat/history - List a user's conversations, most recent first
#[utoipa::path(
    get,
    path = "/api/chat/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "One page of conversation summaries", body = HistoryResponse),
        (status = 400, description = "user_email missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, HandlerError> {
    let user_email =
        required_email(query.user_email.as_deref()).ok_or_else(|| bad_request("user_email is required"))?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let summaries = state
        .db
        .list_conversations(&user_email, page, limit)
        .await
        .map_err(|e| internal_error("Failed to load chat history", e))?;

    let has_more = summaries.len() == limit as usize;
    Ok(Json(HistoryResponse {
        conversations: summaries.into_iter().map(Into::into).collect(),
        page,
        limit,
        has_more,
    }))
}

/// GET /api/chat/{conversation_id} - Fetch a full conversation
#[utoipa::path(
    get,
    path = "/api/chat/{conversation_id}",
    params(("conversation_id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The conversation", body = ConversationResponse),
        (status = 400, description = "Malformed conversation id"),
        (status = 404, description = "Conversation not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationResponse>, HandlerError> {
    let id = Uuid::parse_str(&conversation_id)
        .map_err(|_| bad_request("conversationId is not a valid id"))?;

    match state.db.get_conversation(id).await {
        Ok(conversation) => Ok(Json(conversation.into())),
        Err(PortError::NotFound(_)) => {
            Err((StatusCode::NOT_FOUND, "Conversation not found".to_string()))
        }
        Err(e) => Err(internal_error("Failed to load conversation", e)),
    }
}
