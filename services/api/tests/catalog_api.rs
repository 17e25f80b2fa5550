mod common;

use axum::http::StatusCode;
use common::{agency, FixedEmbedder, InMemoryDb, ScriptedGenerator, TestApp};
use serde_json::json;
use std::sync::atomic::Ordering;

fn catalog() -> InMemoryDb {
    InMemoryDb::with_agencies(vec![
        agency("a-1", "Sunrise Home Care", "Ikeja"),
        agency("a-2", "Gentle Hands Caregivers", "Lekki"),
        agency("a-3", "Harmony Assisted Living", "Wuse II"),
    ])
}

#[tokio::test]
async fn agencies_are_listed_unfiltered() {
    let app = TestApp::with_db(catalog(), ScriptedGenerator::replying(""));

    let (status, body) = app.get("/api/agencies").await;

    assert_eq!(status, StatusCode::OK);
    let agencies = body.as_array().unwrap();
    assert_eq!(agencies.len(), 3);
    assert_eq!(agencies[1]["name"], "Gentle Hands Caregivers");
    assert_eq!(agencies[1]["location"]["area"], "Lekki");
}

#[tokio::test]
async fn seeding_twice_leaves_one_vector_per_agency() {
    let app = TestApp::with_db(catalog(), ScriptedGenerator::replying(""));

    let (status, body) = app.post_json("/api/seed-vectors", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, _) = app.post_json("/api/seed-vectors", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.vector_index.len(), 3);
    assert_eq!(app.embedder.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn seeding_an_empty_catalog_upserts_nothing() {
    let app = TestApp::new(ScriptedGenerator::replying(""));

    let (status, body) = app.post_json("/api/seed-vectors", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(app.vector_index.len(), 0);
}

#[tokio::test]
async fn seeding_stops_at_the_first_embedding_failure() {
    let app = TestApp::with_embedder(
        catalog(),
        FixedEmbedder::failing_on(2),
        ScriptedGenerator::replying(""),
    );

    let (status, _) = app.post_json("/api/seed-vectors", json!({})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.embedder.calls.load(Ordering::SeqCst), 2);
    assert_eq!(app.vector_index.len(), 0);
}
