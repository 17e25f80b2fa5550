//! In-memory stand-ins for every port, plus helpers to drive the router.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{create_app, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use carefinder_core::domain::{
    Agency, AgencyLocation, Conversation, ConversationSummary, Exchange, InlineImage,
    ProfileUpdate, UserProfile, VectorMatch, VectorRecord,
};
use carefinder_core::ports::{
    AgencyCatalog, DatabaseService, EmbeddingService, GenerationService, PortError, PortResult,
    TitleGenerationService, VectorIndexService,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// Database
//=========================================================================================

#[derive(Default)]
struct DbInner {
    profiles: HashMap<String, UserProfile>,
    agencies: Vec<Agency>,
    conversations: Vec<Conversation>,
}

#[derive(Default)]
pub struct InMemoryDb {
    inner: Mutex<DbInner>,
}

impl InMemoryDb {
    pub fn with_agencies(agencies: Vec<Agency>) -> Self {
        let db = Self::default();
        db.inner.lock().unwrap().agencies = agencies;
        db
    }

    pub fn profile_count(&self) -> usize {
        self.inner.lock().unwrap().profiles.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.inner.lock().unwrap().conversations.len()
    }

    /// Inserts a conversation directly, aged by `minutes_ago`.
    pub fn seed_conversation(&self, user_email: &str, title: &str, minutes_ago: i64) -> Uuid {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_email: user_email.to_string(),
            title: title.to_string(),
            created_at: at,
            updated_at: at,
            exchanges: vec![Exchange::user("hello", at), Exchange::assistant("hi", at)],
        };
        let id = conversation.id;
        self.inner.lock().unwrap().conversations.push(conversation);
        id
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn get_profile(&self, email: &str) -> PortResult<UserProfile> {
        self.inner
            .lock()
            .unwrap()
            .profiles
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn upsert_profile(&self, update: ProfileUpdate) -> PortResult<UserProfile> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner.profiles.get(&update.email).cloned();
        let profile = update.merge_into(existing, Utc::now());
        inner.profiles.insert(profile.email.clone(), profile.clone());
        Ok(profile)
    }

    async fn list_agencies(&self) -> PortResult<Vec<Agency>> {
        Ok(self.inner.lock().unwrap().agencies.clone())
    }

    async fn replace_agencies(&self, agencies: Vec<Agency>) -> PortResult<usize> {
        let count = agencies.len();
        self.inner.lock().unwrap().agencies = agencies;
        Ok(count)
    }

    async fn get_conversation(&self, conversation_id: Uuid) -> PortResult<Conversation> {
        self.inner
            .lock()
            .unwrap()
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(conversation_id.to_string()))
    }

    async fn create_conversation(
        &self,
        user_email: &str,
        title: &str,
        exchanges: Vec<Exchange>,
    ) -> PortResult<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_email: user_email.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            exchanges,
        };
        self.inner
            .lock()
            .unwrap()
            .conversations
            .push(conversation.clone());
        Ok(conversation)
    }

    async fn append_exchanges(
        &self,
        conversation_id: Uuid,
        exchanges: Vec<Exchange>,
        title: Option<String>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let conversation = inner
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| PortError::NotFound(conversation_id.to_string()))?;
        conversation.exchanges.extend(exchanges);
        if let Some(title) = title {
            conversation.title = title;
        }
        conversation.updated_at = Utc::now();
        Ok(())
    }

    async fn list_conversations(
        &self,
        user_email: &str,
        page: u32,
        limit: u32,
    ) -> PortResult<Vec<ConversationSummary>> {
        let inner = self.inner.lock().unwrap();
        let mut owned: Vec<&Conversation> = inner
            .conversations
            .iter()
            .filter(|c| c.user_email == user_email)
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let offset = (page.saturating_sub(1) * limit) as usize;
        Ok(owned
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|c| ConversationSummary {
                id: c.id,
                title: c.title.clone(),
                created_at: c.created_at,
                updated_at: c.updated_at,
                message_count: c.exchanges.len() as i64,
            })
            .collect())
    }
}

#[async_trait]
impl AgencyCatalog for InMemoryDb {
    async fn list_agencies(&self) -> PortResult<Vec<Agency>> {
        DatabaseService::list_agencies(self).await
    }
}

//=========================================================================================
// Embeddings and Vector Index
//=========================================================================================

#[derive(Default)]
pub struct FixedEmbedder {
    pub calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl FixedEmbedder {
    /// Fails the `n`th call (1-based) and every call after it.
    pub fn failing_on(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(n),
        }
    }
}

#[async_trait]
impl EmbeddingService for FixedEmbedder {
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call.is_some_and(|n| call >= n) {
            return Err(PortError::Unexpected("embedding quota exhausted".to_string()));
        }
        Ok(vec![text.len() as f32, 1.0, 0.5])
    }
}

/// Upserts overwrite by id. Queries return stored records in id order.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    records: Mutex<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndexService for InMemoryVectorIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> PortResult<usize> {
        let count = records.len();
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.insert(record.id.clone(), record);
        }
        Ok(count)
    }

    async fn query(&self, _vector: Vec<f32>, top_k: usize) -> PortResult<Vec<VectorMatch>> {
        let stored = self.records.lock().unwrap();
        let mut hits: Vec<VectorMatch> = stored
            .values()
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: 0.9,
                metadata: Some(r.metadata.clone()),
            })
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits.truncate(top_k);
        Ok(hits)
    }
}

//=========================================================================================
// Generation
//=========================================================================================

/// Returns a canned reply and records every prompt it was given.
pub struct ScriptedGenerator {
    reply: String,
    fail: bool,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn respond(&self, prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(PortError::Unexpected("upstream unavailable".to_string()));
        }
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        self.respond(prompt)
    }

    async fn generate_with_image(&self, prompt: &str, _image: &InlineImage) -> PortResult<String> {
        self.respond(prompt)
    }
}

pub struct FixedTitle {
    title: String,
    pub calls: AtomicUsize,
}

impl FixedTitle {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TitleGenerationService for FixedTitle {
    async fn generate_title(&self, _text: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.title.clone())
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub const STRUCTURED_REPLY: &str = r#"```json
{"reply": "Sunrise Home Care in Ikeja looks like a good fit.",
 "recommendations": [{"name": "Sunrise Home Care", "rating": 4.7, "location": "Ikeja, Lagos", "reason": "Offers nursing"}]}
```"#;

pub fn agency(id: &str, name: &str, area: &str) -> Agency {
    Agency {
        id: id.to_string(),
        name: name.to_string(),
        location: AgencyLocation {
            city: "Lagos".to_string(),
            area: area.to_string(),
        },
        services: vec!["nursing".to_string(), "companionship".to_string()],
        rating: 4.5,
        contact: "+234 800 000 0000".to_string(),
        policy: "Flexible bookings.".to_string(),
    }
}

pub fn test_config() -> Config {
    Config::from_vars(|key| {
        match key {
            "DATABASE_URL" => Some("postgres://localhost/carefinder_test"),
            "GEMINI_API_KEYS" => Some("test-key"),
            "PINECONE_API_KEY" => Some("test-pinecone-key"),
            "PINECONE_INDEX_HOST" => Some("https://index.test"),
            _ => None,
        }
        .map(str::to_string)
    })
    .expect("test config is complete")
}

/// Every fake behind one application, with handles kept for assertions.
pub struct TestApp {
    pub db: Arc<InMemoryDb>,
    pub embedder: Arc<FixedEmbedder>,
    pub vector_index: Arc<InMemoryVectorIndex>,
    pub generator: Arc<ScriptedGenerator>,
    pub titles: Arc<FixedTitle>,
    state: Arc<AppState>,
}

impl TestApp {
    pub fn new(generator: ScriptedGenerator) -> Self {
        Self::with_db(InMemoryDb::default(), generator)
    }

    pub fn with_db(db: InMemoryDb, generator: ScriptedGenerator) -> Self {
        Self::with_embedder(db, FixedEmbedder::default(), generator)
    }

    pub fn with_embedder(
        db: InMemoryDb,
        embedder: FixedEmbedder,
        generator: ScriptedGenerator,
    ) -> Self {
        let db = Arc::new(db);
        let embedder = Arc::new(embedder);
        let vector_index = Arc::new(InMemoryVectorIndex::default());
        let generator = Arc::new(generator);
        let titles = Arc::new(FixedTitle::new("Care Options In Lagos"));

        let state = Arc::new(AppState {
            db: db.clone(),
            catalog: db.clone(),
            config: Arc::new(test_config()),
            embedder: embedder.clone(),
            vector_index: vector_index.clone(),
            generator: generator.clone(),
            title_adapter: titles.clone(),
        });

        Self {
            db,
            embedder,
            vector_index,
            generator,
            titles,
            state,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_app(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }
}
