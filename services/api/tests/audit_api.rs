mod common;

use axum::http::StatusCode;
use common::{ScriptedGenerator, TestApp};
use serde_json::json;

const REPORT: &str = "```json\n{\"score\": 72, \"hazards\": [\"loose rug\"], \"recommendations\": [\"tape the rug\"]}\n```";

// "fake-png-bytes"
const IMAGE: &str = "ZmFrZS1wbmctYnl0ZXM=";

#[tokio::test]
async fn audit_without_image_never_calls_the_model() {
    let app = TestApp::new(ScriptedGenerator::replying(REPORT));

    let (status, _) = app
        .post_json(
            "/api/audit-image",
            json!({"user_email": "ada@example.com", "roomType": "Bathroom"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.generator.call_count(), 0);
}

#[tokio::test]
async fn invalid_base64_is_rejected() {
    let app = TestApp::new(ScriptedGenerator::replying(REPORT));

    let (status, _) = app
        .post_json(
            "/api/audit-image",
            json!({"user_email": "ada@example.com", "imageBase64": "***not base64***"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.generator.call_count(), 0);
}

#[tokio::test]
async fn audit_returns_the_report_without_fences() {
    let app = TestApp::new(ScriptedGenerator::replying(REPORT));

    let (status, body) = app
        .post_json(
            "/api/audit-image",
            json!({
                "user_email": "ada@example.com",
                "roomType": "Bathroom",
                "imageBase64": format!("data:image/png;base64,{}", IMAGE)
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let report: serde_json::Value =
        serde_json::from_str(body["audit_report"].as_str().unwrap()).unwrap();
    assert_eq!(report["score"], 72);
    assert!(app.generator.last_prompt().unwrap().contains("photo of a Bathroom"));
}

#[tokio::test]
async fn room_type_defaults_to_general() {
    let app = TestApp::new(ScriptedGenerator::replying(REPORT));

    let (status, _) = app
        .post_json(
            "/api/audit-image",
            json!({"user_email": "ada@example.com", "imageBase64": IMAGE}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.generator.last_prompt().unwrap().contains("photo of a General"));
}

#[tokio::test]
async fn model_failure_is_a_server_error() {
    let app = TestApp::new(ScriptedGenerator::failing());

    let (status, _) = app
        .post_json(
            "/api/audit-image",
            json!({"user_email": "ada@example.com", "imageBase64": IMAGE}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
