//! services/api/src/web/chat_task.rs
//!
//! The retrieval-augmented chat cycle: profile lookup, transcript, embedding,
//! vector search, prompt assembly, generation, parsing and persistence.
//! Every step runs sequentially and the first failing call aborts the request.

use crate::prompts::{build_chat_prompt, build_title_input, TRANSCRIPT_WINDOW};
use crate::reply::{clean_title, parse_chat_reply, retain_retrieved, Recommendation};
use crate::web::state::AppState;
use carefinder_core::domain::{Exchange, UserProfile};
use carefinder_core::ports::{PortError, PortResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A validated chat request.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub user_email: String,
    pub message: String,
    pub conversation_id: Option<Uuid>,
}

/// What the handler sends back to the client.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub recommendations: Vec<Recommendation>,
    pub conversation_id: Uuid,
    pub title: String,
}

/// Resolves a profile, treating an unknown email as an anonymous caller.
pub(crate) async fn resolve_profile(
    app_state: &AppState,
    email: &str,
) -> PortResult<Option<UserProfile>> {
    match app_state.db.get_profile(email).await {
        Ok(profile) => Ok(Some(profile)),
        Err(PortError::NotFound(_)) => {
            info!("No profile for {}, continuing anonymously", email);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn generate_title(app_state: &AppState, message: &str, reply: &str) -> PortResult<String> {
    let raw = app_state
        .title_adapter
        .generate_title(&build_title_input(message, reply))
        .await?;
    Ok(clean_title(&raw))
}

/// Runs one chat exchange end to end.
pub async fn chat_process(app_state: Arc<AppState>, input: ChatInput) -> PortResult<ChatOutcome> {
    let start_time = Instant::now();
    let received_at = Utc::now();

    let profile = resolve_profile(&app_state, &input.user_email).await?;

    let existing = match input.conversation_id {
        Some(id) => match app_state.db.get_conversation(id).await {
            Ok(conversation) if conversation.user_email == input.user_email => Some(conversation),
            Ok(_) => {
                warn!("Conversation {} belongs to another user, starting a new one", id);
                None
            }
            Err(PortError::NotFound(_)) => {
                warn!("Conversation {} not found, starting a new one", id);
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };
    let history = existing
        .as_ref()
        .map(|c| c.recent_exchanges(TRANSCRIPT_WINDOW))
        .unwrap_or_default();

    let retrieval_start = Instant::now();
    let query_vector = app_state.embedder.embed(&input.message).await?;
    let matches = app_state
        .vector_index
        .query(query_vector, app_state.config.vector_top_k)
        .await?;
    info!(
        "⏱️ Retrieval took {:?}, {} agencies matched",
        retrieval_start.elapsed(),
        matches.len()
    );

    let prompt = build_chat_prompt(profile.as_ref(), history, &matches, &input.message);
    debug!("Chat prompt is {} characters", prompt.len());

    let generation_start = Instant::now();
    let raw_output = app_state.generator.generate(&prompt).await?;
    info!("⏱️ Generation took {:?}", generation_start.elapsed());

    let parsed = parse_chat_reply(&raw_output);
    let recommendations = retain_retrieved(parsed.recommendations, &matches);
    let exchanges = vec![
        Exchange::user(input.message.clone(), received_at),
        Exchange::assistant(parsed.reply.clone(), Utc::now()),
    ];

    let (conversation_id, title) = match existing {
        Some(conversation) if !conversation.title.trim().is_empty() => {
            app_state
                .db
                .append_exchanges(conversation.id, exchanges, None)
                .await?;
            (conversation.id, conversation.title)
        }
        Some(conversation) => {
            let title = generate_title(&app_state, &input.message, &parsed.reply).await?;
            app_state
                .db
                .append_exchanges(conversation.id, exchanges, Some(title.clone()))
                .await?;
            (conversation.id, title)
        }
        None => {
            let title = generate_title(&app_state, &input.message, &parsed.reply).await?;
            let conversation = app_state
                .db
                .create_conversation(&input.user_email, &title, exchanges)
                .await?;
            (conversation.id, conversation.title)
        }
    };

    info!(
        "Chat for {} answered in {:?} (conversation {})",
        input.user_email,
        start_time.elapsed(),
        conversation_id
    );

    Ok(ChatOutcome {
        reply: parsed.reply,
        recommendations,
        conversation_id,
        title,
    })
}
