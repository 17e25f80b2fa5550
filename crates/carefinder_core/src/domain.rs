//! crates/carefinder_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// User Profiles
//=========================================================================================

/// A stored user profile. The email is the only identity the system knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub profile_pic: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile submission. Every field except the email is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: String,
    pub name: Option<String>,
    pub profile_pic: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

impl ProfileUpdate {
    /// Turns blank or whitespace-only text fields into `None`.
    ///
    /// A `None` field never overwrites a stored value.
    pub fn without_blanks(self) -> Self {
        Self {
            email: self.email,
            name: non_blank(self.name),
            profile_pic: non_blank(self.profile_pic),
            phone: non_blank(self.phone),
            age: self.age,
            address: non_blank(self.address),
            medical_history: non_blank(self.medical_history),
        }
    }

    /// Applies this submission on top of an existing profile, or creates one.
    ///
    /// Non-empty submitted fields overwrite; blank or absent fields keep the prior value.
    pub fn merge_into(self, existing: Option<UserProfile>, now: DateTime<Utc>) -> UserProfile {
        let update = self.without_blanks();
        let base = existing.unwrap_or_else(|| UserProfile {
            email: update.email.clone(),
            name: None,
            profile_pic: None,
            phone: None,
            age: None,
            address: None,
            medical_history: None,
            created_at: now,
            updated_at: now,
        });

        UserProfile {
            email: base.email,
            name: update.name.or(base.name),
            profile_pic: update.profile_pic.or(base.profile_pic),
            phone: update.phone.or(base.phone),
            age: update.age.or(base.age),
            address: update.address.or(base.address),
            medical_history: update.medical_history.or(base.medical_history),
            created_at: base.created_at,
            updated_at: now,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// Agencies
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AgencyLocation {
    pub city: String,
    pub area: String,
}

/// A care-provider record from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub location: AgencyLocation,
    pub services: Vec<String>,
    pub rating: f64,
    pub contact: String,
    pub policy: String,
}

impl Agency {
    /// A single descriptive sentence used as the embedding input for this agency.
    pub fn description(&self) -> String {
        format!(
            "{} is an elder-care agency located in {}, {}. Services offered: {}. Rating: {:.1}/5. Contact: {}. Policy: {}",
            self.name,
            self.location.area,
            self.location.city,
            self.services.join(", "),
            self.rating,
            self.contact,
            self.policy
        )
    }

    /// The flattened metadata stored next to this agency's vector.
    pub fn metadata(&self) -> AgencyMetadata {
        AgencyMetadata {
            name: self.name.clone(),
            area: self.location.area.clone(),
            services: self.services.clone(),
            rating: self.rating,
        }
    }
}

//=========================================================================================
// Conversations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRole {
    User,
    Assistant,
}

impl SenderRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderRole::User => "user",
            SenderRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(SenderRole::User),
            "assistant" => Some(SenderRole::Assistant),
            _ => None,
        }
    }
}

/// A single message inside a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub role: SenderRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: SenderRole::User,
            text: text.into(),
            timestamp,
        }
    }

    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: SenderRole::Assistant,
            text: text.into(),
            timestamp,
        }
    }
}

/// A chat session owned by one user email. Exchanges are ordered oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: Uuid,
    pub user_email: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub exchanges: Vec<Exchange>,
}

impl Conversation {
    /// The last `limit` exchanges, oldest first.
    pub fn recent_exchanges(&self, limit: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(limit);
        &self.exchanges[start..]
    }
}

/// A row in the history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

//=========================================================================================
// Vector Index Records
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AgencyMetadata {
    pub name: String,
    pub area: String,
    pub services: Vec<String>,
    pub rating: f64,
}

/// A vector upserted into the index, keyed by the agency id.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: AgencyMetadata,
}

/// A nearest-neighbour hit. Metadata may be absent if the index stored none.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<AgencyMetadata>,
}

//=========================================================================================
// Images
//=========================================================================================

/// A base64-encoded image attached inline to a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64_data: String,
}

impl InlineImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn update(email: &str) -> ProfileUpdate {
        ProfileUpdate {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_creates_profile_on_first_submission() {
        let now = Utc::now();
        let profile = ProfileUpdate {
            name: Some("Ada".to_string()),
            age: Some(81),
            ..update("ada@example.com")
        }
        .merge_into(None, now);

        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.age, Some(81));
        assert_eq!(profile.phone, None);
        assert_eq!(profile.created_at, now);
    }

    #[test]
    fn merge_keeps_prior_values_for_blank_fields() {
        let first = Utc::now();
        let existing = ProfileUpdate {
            name: Some("Ada".to_string()),
            phone: Some("555-0100".to_string()),
            medical_history: Some("hip replacement".to_string()),
            ..update("ada@example.com")
        }
        .merge_into(None, first);

        let later = first + Duration::minutes(5);
        let merged = ProfileUpdate {
            name: Some("  ".to_string()),
            phone: Some("555-0199".to_string()),
            ..update("ada@example.com")
        }
        .merge_into(Some(existing), later);

        assert_eq!(merged.name.as_deref(), Some("Ada"));
        assert_eq!(merged.phone.as_deref(), Some("555-0199"));
        assert_eq!(merged.medical_history.as_deref(), Some("hip replacement"));
        assert_eq!(merged.created_at, first);
        assert_eq!(merged.updated_at, later);
    }

    #[test]
    fn blank_fields_are_dropped_from_a_submission() {
        let cleaned = ProfileUpdate {
            name: Some(" ".to_string()),
            phone: Some("".to_string()),
            address: Some("12 Allen Avenue".to_string()),
            age: Some(70),
            ..update("ada@example.com")
        }
        .without_blanks();

        assert_eq!(cleaned.name, None);
        assert_eq!(cleaned.phone, None);
        assert_eq!(cleaned.address.as_deref(), Some("12 Allen Avenue"));
        assert_eq!(cleaned.age, Some(70));
    }

    #[test]
    fn recent_exchanges_returns_tail_in_order() {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_email: "a@b.c".to_string(),
            title: "t".to_string(),
            created_at: now,
            updated_at: now,
            exchanges: (0..35).map(|i| Exchange::user(format!("m{i}"), now)).collect(),
        };

        let recent = conversation.recent_exchanges(30);
        assert_eq!(recent.len(), 30);
        assert_eq!(recent[0].text, "m5");
        assert_eq!(recent[29].text, "m34");
        assert_eq!(conversation.recent_exchanges(100).len(), 35);
    }

    #[test]
    fn description_mentions_every_catalog_field() {
        let agency = Agency {
            id: "a1".to_string(),
            name: "Sunrise Care".to_string(),
            location: AgencyLocation {
                city: "Pune".to_string(),
                area: "Kothrud".to_string(),
            },
            services: vec!["nursing".to_string(), "physiotherapy".to_string()],
            rating: 4.5,
            contact: "020-1234".to_string(),
            policy: "No long-term contracts".to_string(),
        };

        let text = agency.description();
        assert!(text.contains("Sunrise Care"));
        assert!(text.contains("Kothrud, Pune"));
        assert!(text.contains("nursing, physiotherapy"));
        assert!(text.contains("4.5"));
        assert!(text.contains("No long-term contracts"));
    }
}
