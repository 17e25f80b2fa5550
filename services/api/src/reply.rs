//! services/api/src/reply.rs
//!
//! Post-processing of generated text: code-fence stripping, structured parsing
//! of chat replies, title clean-up and image payload normalization.

use carefinder_core::domain::VectorMatch;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

use regex::Regex;

/// Titles longer than this are cut.
pub const TITLE_MAX_CHARS: usize = 50;

pub const FALLBACK_TITLE: &str = "New Conversation";

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z0-9_-]*\s*\n?").expect("valid regex"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?\s*```\s*$").expect("valid regex"));

/// A single agency recommendation as produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub location: String,
    #[serde(default, alias = "justification")]
    pub reason: String,
}

/// The parsed form of a chat generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Removes a leading ```lang fence and a trailing ``` fence, then trims.
pub fn strip_code_fences(raw: &str) -> String {
    let without_open = FENCE_OPEN.replace(raw, "");
    let without_close = FENCE_CLOSE.replace(&without_open, "");
    without_close.trim().to_string()
}

/// Parses a chat generation. Unparseable output becomes the whole reply with no
/// recommendations.
pub fn parse_chat_reply(raw: &str) -> ChatReply {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<ChatReply>(&cleaned) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Generated chat reply was not valid JSON, using raw text: {}", e);
            ChatReply {
                reply: cleaned,
                recommendations: Vec::new(),
            }
        }
    }
}

/// Drops recommendations that do not name one of the retrieved agencies.
///
/// Names are compared case-insensitively after trimming. No matches means no recommendations.
pub fn retain_retrieved(
    recommendations: Vec<Recommendation>,
    matches: &[VectorMatch],
) -> Vec<Recommendation> {
    let known: Vec<String> = matches
        .iter()
        .filter_map(|m| m.metadata.as_ref())
        .map(|meta| meta.name.trim().to_lowercase())
        .collect();

    let (kept, dropped): (Vec<_>, Vec<_>) = recommendations
        .into_iter()
        .partition(|r| known.contains(&r.name.trim().to_lowercase()));
    if !dropped.is_empty() {
        tracing::warn!(
            "Discarded {} recommendation(s) naming agencies outside the retrieved set",
            dropped.len()
        );
    }
    kept
}

/// Trims quotes and whitespace from a generated title and cuts it to the budget.
pub fn clean_title(raw: &str) -> String {
    let trimmed = raw
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim();
    if trimmed.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    trimmed.chars().take(TITLE_MAX_CHARS).collect::<String>().trim_end().to_string()
}

/// Splits an optional `data:<mime>;base64,` prefix off an image payload.
///
/// Returns the mime type (defaulting to JPEG) and the bare base64 data.
pub fn split_data_uri(payload: &str) -> (String, &str) {
    let payload = payload.trim();
    if let Some(rest) = payload.strip_prefix("data:") {
        if let Some((header, data)) = rest.split_once(',') {
            let mime = header
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_IMAGE_MIME);
            return (mime.to_string(), data);
        }
    }
    (DEFAULT_IMAGE_MIME.to_string(), payload)
}
