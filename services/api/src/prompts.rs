//! services/api/src/prompts.rs
//!
//! Prompt templates and the functions that fill them in. Every prompt sent to the
//! generative API is assembled here by plain string substitution.

use carefinder_core::domain::{Exchange, SenderRole, UserProfile, VectorMatch};

/// How many past exchanges the model gets to see. Older ones are dropped, not summarized.
pub const TRANSCRIPT_WINDOW: usize = 30;

/// Substituted for the agency context when the vector index returns nothing.
pub const NO_AGENCIES_MARKER: &str = "NO_AGENCIES_FOUND: no agencies in the directory matched this request.";

const CHAT_TEMPLATE: &str = r#"You are CareFinder, an assistant that helps families find elder-care agencies.

ZERO HALLUCINATION RULES:
- Every agency name, rating, location, service or policy you mention MUST appear in RETRIEVED AGENCIES below.
- Never invent agencies, phone numbers, prices or ratings.
- If RETRIEVED AGENCIES says NO_AGENCIES_FOUND, say that no matching agency was found in the directory and return an empty "recommendations" list.
- You may use USER PROFILE and CONVERSATION SO FAR to personalise the tone and to understand follow-up questions.

USER PROFILE:
{profile}

CONVERSATION SO FAR:
{transcript}

RETRIEVED AGENCIES:
{agencies}

USER MESSAGE:
{message}

Respond with ONLY a JSON object, no Markdown, in exactly this shape:
{"reply": "<your answer to the user>", "recommendations": [{"name": "<agency name>", "rating": <number>, "location": "<area, city>", "reason": "<why it fits this user>"}]}"#;

pub const TITLE_INSTRUCTIONS: &str = "You are a title generation assistant. Generate a short, descriptive title (maximum 6 words) for a conversation that starts with the exchange below. Respond with ONLY the title, no quotes, no explanation.";

const AUDIT_TEMPLATE: &str = r#"You are a certified home-safety assessor for older adults. Audit the attached photo of a {room_type}.

REFERENCE CHECKLIST (accessibility standards):
1. Floors: no loose rugs, cords or clutter in walking paths; non-slip surfaces in wet areas.
2. Lighting: light switches reachable at room entrances; night lighting between bed and bathroom; no dark stairways.
3. Grab bars: installed beside toilet and inside shower/tub, rated for body weight, 33-36 inches above the floor.
4. Stairs: sturdy handrails on both sides, contrasting edge markings, no objects left on steps.
5. Furniture: stable chairs with armrests, bed and seat heights between 17 and 19 inches, clear 36-inch pathways.
6. Bathroom: raised toilet seat if needed, shower chair, anti-scald water temperature at or below 120F.
7. Kitchen: frequently used items between shoulder and hip height, no need for step stools, working smoke detector.
8. Emergency: phone or alert device reachable from the floor, visible emergency numbers, unobstructed exits.

RESIDENT CONTEXT:
{profile}

Respond with ONLY a JSON object, no Markdown, in exactly this shape:
{"score": <0-100 safety score>, "hazards": [{"item": "<what>", "risk": "<low|medium|high>", "detail": "<why it is a hazard>"}], "recommendations": ["<concrete fix>"]}"#;

//=========================================================================================
// Context Rendering
//=========================================================================================

/// Renders the caller's profile, or an anonymous placeholder.
pub fn render_profile(profile: Option<&UserProfile>) -> String {
    let Some(profile) = profile else {
        return "Anonymous user (no profile on file).".to_string();
    };

    let mut lines = vec![format!("Email: {}", profile.email)];
    if let Some(name) = &profile.name {
        lines.push(format!("Name: {}", name));
    }
    if let Some(age) = profile.age {
        lines.push(format!("Age: {}", age));
    }
    if let Some(address) = &profile.address {
        lines.push(format!("Address: {}", address));
    }
    if let Some(history) = &profile.medical_history {
        lines.push(format!("Medical history: {}", history));
    }
    lines.join("\n")
}

/// Renders exchanges as a plain `User:`/`Assistant:` transcript.
pub fn render_transcript(exchanges: &[Exchange]) -> String {
    if exchanges.is_empty() {
        return "(new conversation)".to_string();
    }

    exchanges
        .iter()
        .map(|e| {
            let speaker = match e.role {
                SenderRole::User => "User",
                SenderRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, e.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders retrieved agencies, one per line, or the no-agencies marker.
pub fn render_agencies(matches: &[VectorMatch]) -> String {
    let lines: Vec<String> = matches
        .iter()
        .filter_map(|m| {
            m.metadata.as_ref().map(|meta| {
                format!(
                    "- {} | area: {} | services: {} | rating: {:.1}",
                    meta.name,
                    meta.area,
                    meta.services.join(", "),
                    meta.rating
                )
            })
        })
        .collect();

    if lines.is_empty() {
        NO_AGENCIES_MARKER.to_string()
    } else {
        lines.join("\n")
    }
}

//=========================================================================================
// Prompt Builders
//=========================================================================================

pub fn build_chat_prompt(
    profile: Option<&UserProfile>,
    history: &[Exchange],
    matches: &[VectorMatch],
    message: &str,
) -> String {
    CHAT_TEMPLATE
        .replace("{profile}", &render_profile(profile))
        .replace("{transcript}", &render_transcript(history))
        .replace("{agencies}", &render_agencies(matches))
        .replace("{message}", message)
}

/// The opening exchange handed to the title generator, capped at 1000 characters.
pub fn build_title_input(message: &str, reply: &str) -> String {
    format!("User: {}\nAssistant: {}", message, reply)
        .chars()
        .take(1000)
        .collect()
}

pub fn build_audit_prompt(room_type: &str, profile: Option<&UserProfile>) -> String {
    let context = match profile {
        Some(p) => format!(
            "{}\nKnown conditions: {}",
            render_profile(Some(p)),
            p.medical_history.as_deref().unwrap_or("none reported")
        ),
        None => render_profile(None),
    };
    AUDIT_TEMPLATE
        .replace("{room_type}", room_type)
        .replace("{profile}", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carefinder_core::domain::AgencyMetadata;
    use chrono::Utc;

    fn hit(name: &str) -> VectorMatch {
        VectorMatch {
            id: name.to_lowercase(),
            score: 0.9,
            metadata: Some(AgencyMetadata {
                name: name.to_string(),
                area: "Baner".to_string(),
                services: vec!["home nursing".to_string()],
                rating: 4.2,
            }),
        }
    }

    #[test]
    fn transcript_labels_each_speaker_in_order() {
        let now = Utc::now();
        let exchanges = vec![
            Exchange::user("Is there a nurse nearby?", now),
            Exchange::assistant("Sunrise Care offers nursing.", now),
        ];

        assert_eq!(
            render_transcript(&exchanges),
            "User: Is there a nurse nearby?\nAssistant: Sunrise Care offers nursing."
        );
        assert_eq!(render_transcript(&[]), "(new conversation)");
    }

    #[test]
    fn empty_retrieval_substitutes_the_marker() {
        let prompt = build_chat_prompt(None, &[], &[], "any agencies near me?");
        assert!(prompt.contains(NO_AGENCIES_MARKER));
        assert!(prompt.contains("Never invent agencies"));
        assert!(prompt.contains("Anonymous user"));
    }

    #[test]
    fn matches_without_metadata_count_as_empty() {
        let bare = VectorMatch {
            id: "x".to_string(),
            score: 0.1,
            metadata: None,
        };
        assert_eq!(render_agencies(&[bare]), NO_AGENCIES_MARKER);
    }

    #[test]
    fn chat_prompt_carries_every_context_block() {
        let now = Utc::now();
        let profile = UserProfile {
            email: "r@example.com".to_string(),
            name: Some("Ravi".to_string()),
            profile_pic: None,
            phone: None,
            age: Some(77),
            address: None,
            medical_history: Some("diabetes".to_string()),
            created_at: now,
            updated_at: now,
        };
        let history = vec![Exchange::user("hello", now), Exchange::assistant("hi", now)];

        let prompt = build_chat_prompt(Some(&profile), &history, &[hit("Sunrise Care")], "nursing?");
        assert!(prompt.contains("Name: Ravi"));
        assert!(prompt.contains("Medical history: diabetes"));
        assert!(prompt.contains("User: hello\nAssistant: hi"));
        assert!(prompt.contains("- Sunrise Care | area: Baner"));
        assert!(prompt.ends_with("\"reason\": \"<why it fits this user>\"}]}"));
        assert!(prompt.contains("USER MESSAGE:\nnursing?"));
    }

    #[test]
    fn audit_prompt_names_room_and_conditions() {
        let prompt = build_audit_prompt("bathroom", None);
        assert!(prompt.contains("photo of a bathroom"));
        assert!(prompt.contains("Grab bars"));
        assert!(prompt.contains("Anonymous user"));
    }
}
