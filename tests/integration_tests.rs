//! End-to-end HTTP tests
//!
//! Drive the axum router in-process with mock backends and a fake
//! transcript source. Nothing here touches the network.

mod common;

use axum::body::Body;
use axum::http::header::RETRY_AFTER;
use axum::http::{Request, StatusCode};
use base64::Engine;
use serde_json::json;
use tower::ServiceExt;

use glowstack::error::FailureClass;
use glowstack::prompt::templates;
use glowstack::provider::{GenerationMode, MockConfig};
use glowstack::server::HEALTH_PAGE;

use common::{app, app_with, app_with_body_limit, post_json, post_raw, FakeTranscripts};

fn tiny_jpeg_base64() -> String {
    base64::engine::general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

// ─────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_page() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), HEALTH_PAGE);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/confidence-boost")
        .header("origin", "https://glow.example")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

// ─────────────────────────────────────────────────────────────────
// Persona chat
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_persona_chat_known_mentor() {
    let app = app();
    let response = post_json(
        &app.router,
        "/api/senior-chat",
        json!({"seniorId": "elon", "message": "Should I take it easy this semester?"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let reply = response.body["reply"].as_str().unwrap();
    assert!(!reply.is_empty());

    let request = app.gemini.last_request().unwrap();
    assert!(request.payload.system.as_deref().unwrap().contains("Elon Musk"));
    assert_eq!(request.payload.user.text(), "Should I take it easy this semester?");
    assert!(matches!(request.mode, GenerationMode::MultiTurn(_)));
}

#[tokio::test]
async fn test_persona_chat_unknown_mentor() {
    let app = app();
    let response = post_json(&app.router, "/api/senior-chat", json!({"seniorId": "notreal", "message": "hi"})).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"reply": "Mentor not found."}));
    assert_eq!(app.gemini.call_count(), 0);
}

#[tokio::test]
async fn test_persona_chat_missing_history_equals_empty_history() {
    let app = app();
    let without = post_json(&app.router, "/api/senior-chat", json!({"seniorId": "riya", "message": "hello"})).await;
    let with_empty = post_json(
        &app.router,
        "/api/senior-chat",
        json!({"seniorId": "riya", "message": "hello", "history": []}),
    )
    .await;
    let with_garbage = post_json(
        &app.router,
        "/api/senior-chat",
        json!({"seniorId": "riya", "message": "hello", "history": "not a list"}),
    )
    .await;

    assert_eq!(without.status, StatusCode::OK);
    assert_eq!(without.body, with_empty.body);
    assert_eq!(without.body, with_garbage.body);

    let requests = app.gemini.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.history().is_empty()));
}

#[tokio::test]
async fn test_persona_chat_forwards_history_in_order() {
    let app = app();
    let response = post_json(
        &app.router,
        "/api/senior-chat",
        json!({
            "seniorId": "warren",
            "message": "And index funds?",
            "history": [
                {"role": "user", "parts": [{"text": "Should I buy crypto?"}]},
                {"role": "model", "parts": [{"text": "Buy what you understand."}]}
            ]
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let history = app.gemini.last_request().unwrap().history().to_vec();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "Should I buy crypto?");
    assert_eq!(history[1].content, "Buy what you understand.");
}

// ─────────────────────────────────────────────────────────────────
// Notes
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_notes_without_transcript() {
    let app = app();
    let response = post_json(&app.router, "/generate-notes", json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"notes": "No audio detected."}));
}

#[tokio::test]
async fn test_generate_notes_success() {
    let app = app_with(
        MockConfig::replying("- recursion\n- memoization"),
        MockConfig::default(),
        FakeTranscripts::Fragments(vec![]),
    );
    let response = post_json(&app.router, "/generate-notes", json!({"transcript": "today we cover recursion"})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"notes": "- recursion\n- memoization"}));
}

#[tokio::test]
async fn test_youtube_notes_use_joined_transcript() {
    let app = app();
    let response = post_json(&app.router, "/youtube-to-notes", json!({"videoUrl": "https://youtu.be/abc"})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["notes"].is_string());

    let request = app.gemini.last_request().unwrap();
    assert!(request.payload.user.text().ends_with("arrays then graphs"));
    assert_eq!(request.payload.system.as_deref(), Some(templates::GLOW_SCRIBE_SYSTEM));
}

#[tokio::test]
async fn test_youtube_notes_transcript_refused() {
    let app = app_with(
        MockConfig::default(),
        MockConfig::default(),
        FakeTranscripts::Refused {
            status: 403,
            detail: Some("Captions are disabled"),
        },
    );
    let response = post_json(&app.router, "/youtube-to-notes", json!({"videoUrl": "https://youtu.be/abc"})).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body,
        json!({"notes": "### ⚠️ API Error\nReason: Captions are disabled"})
    );
    assert_eq!(app.gemini.call_count(), 0);
}

#[tokio::test]
async fn test_youtube_notes_transcript_unreachable() {
    let app = app_with(MockConfig::default(), MockConfig::default(), FakeTranscripts::Unreachable);
    let response = post_json(&app.router, "/youtube-to-notes", json!({"videoUrl": "https://youtu.be/abc"})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"notes": "Server Error."}));
    assert_eq!(response.headers[RETRY_AFTER], "30");
}

#[tokio::test]
async fn test_youtube_notes_without_captions() {
    let app = app_with(MockConfig::default(), MockConfig::default(), FakeTranscripts::Fragments(vec![]));
    let response = post_json(&app.router, "/youtube-to-notes", json!({"videoUrl": "https://youtu.be/silent"})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"notes": "Server Error."}));
    assert_eq!(app.gemini.call_count(), 0);
}

// ─────────────────────────────────────────────────────────────────
// Simplify and vision
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_simplify_eli5() {
    let app = app();
    let response = post_json(
        &app.router,
        "/simplify-doc",
        json!({"text": "Paging maps virtual to physical frames.", "mode": "eli5"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["reply"].is_string());

    let prompt = app.gemini.last_request().unwrap().payload.user.text().to_string();
    assert!(prompt.contains(templates::SIMPLIFY_ELI5));
    assert!(prompt.contains("Paging maps virtual to physical frames."));
}

#[tokio::test]
async fn test_simplify_unknown_mode_uses_bullets() {
    let app = app();
    post_json(&app.router, "/simplify-doc", json!({"text": "TCP is reliable.", "mode": "haiku"})).await;

    let prompt = app.gemini.last_request().unwrap().payload.user.text().to_string();
    assert!(prompt.contains(templates::SIMPLIFY_BULLETS));
}

#[tokio::test]
async fn test_mode_names_are_case_sensitive() {
    let app = app();
    post_json(&app.router, "/simplify-doc", json!({"text": "DNS caches answers.", "mode": "ELI5"})).await;
    let prompt = app.gemini.last_request().unwrap().payload.user.text().to_string();
    assert!(prompt.contains(templates::SIMPLIFY_BULLETS));

    post_json(&app.router, "/api/analyze-style", json!({"image": tiny_jpeg_base64(), "mode": "Skin"})).await;
    let request = app.gemini.last_request().unwrap();
    assert_eq!(request.payload.user.text(), templates::VISION_HAIR);
}

#[tokio::test]
async fn test_vision_unknown_mode_uses_hair_prompt() {
    let app = app();
    let response = post_json(
        &app.router,
        "/api/analyze-style",
        json!({"image": tiny_jpeg_base64(), "mode": "unknown-mode"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);

    let request = app.gemini.last_request().unwrap();
    assert_eq!(request.payload.user.text(), templates::VISION_HAIR);
    let image = request.payload.user.image().unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
}

#[tokio::test]
async fn test_vision_data_url_and_bad_image() {
    let app = app();
    let data_url = format!("data:image/png;base64,{}", tiny_jpeg_base64());
    let response = post_json(&app.router, "/api/analyze-style", json!({"image": data_url, "mode": "glasses"})).await;
    assert_eq!(response.status, StatusCode::OK);
    let request = app.gemini.last_request().unwrap();
    assert_eq!(request.payload.user.text(), templates::VISION_GLASSES);
    assert_eq!(request.payload.user.image().unwrap().mime_type, "image/png");

    let response = post_json(&app.router, "/api/analyze-style", json!({"image": "%%% not base64 %%%"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"reply": "No image received. Snap a selfie and try again!"})
    );
}

// ─────────────────────────────────────────────────────────────────
// Groq-routed tasks and failures
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mega_style_backend_outage() {
    let app = app_with(
        MockConfig::default(),
        MockConfig::failing(FailureClass::Transient),
        FakeTranscripts::Fragments(vec![]),
    );
    let response = post_json(&app.router, "/api/mega-style", json!({"shape": "oval"})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"reply": "Groq is currently busy. Try again!"}));
    assert_eq!(response.headers[RETRY_AFTER], "30");
}

#[tokio::test]
async fn test_rejected_input_has_no_retry_after() {
    let app = app_with(
        MockConfig::default(),
        MockConfig::failing(FailureClass::MalformedInput),
        FakeTranscripts::Fragments(vec![]),
    );
    let response = post_json(&app.router, "/api/style-advice", json!({"shape": "square"})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({"reply": "Groq is busy!"}));
    assert!(response.headers.get(RETRY_AFTER).is_none());
}

#[tokio::test]
async fn test_oversized_body_is_refused_in_task_shape() {
    let app = app_with_body_limit(64);
    let image = "A".repeat(256);

    let response = post_json(&app.router, "/api/analyze-style", json!({"image": image})).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body, json!({"reply": "Request body is too large."}));
    assert!(response.headers.get(RETRY_AFTER).is_none());
    assert_eq!(app.gemini.call_count(), 0);

    let response = post_json(&app.router, "/youtube-to-notes", json!({"videoUrl": image})).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.body["notes"].is_string());

    let response = post_json(&app.router, "/api/mega-style", json!({"shape": "oval"})).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_fitness_requires_both_fields() {
    let app = app();
    let response = post_json(&app.router, "/api/legendary-fitness", json!({"messMeal": "aloo paratha"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.groq.call_count(), 0);

    let response = post_json(
        &app.router,
        "/api/legendary-fitness",
        json!({"messMeal": "aloo paratha", "fitnessGoal": "cut"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let prompt = app.groq.last_request().unwrap().payload.user.text().to_string();
    assert!(prompt.contains("aloo paratha"));
    assert!(prompt.contains("cut"));
}

#[tokio::test]
async fn test_unparsable_body_is_treated_as_empty() {
    let app = app();

    let response = post_raw(&app.router, "/api/confidence-boost", "{definitely not json").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["reply"].is_string());

    let response = post_raw(&app.router, "/generate-notes", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"notes": "No audio detected."}));
}

#[tokio::test]
async fn test_failure_isolation_between_backends() {
    let app = app_with(
        MockConfig::replying("stay curious").with_latency(20),
        MockConfig::failing(FailureClass::Transient).with_latency(5),
        FakeTranscripts::Fragments(vec![]),
    );

    let (failing, healthy) = tokio::join!(
        post_json(&app.router, "/api/style-advice", json!({"shape": "round"})),
        post_json(&app.router, "/api/senior-chat", json!({"seniorId": "aditi", "message": "hey"})),
    );

    assert_eq!(failing.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(healthy.status, StatusCode::OK);
    assert_eq!(healthy.body, json!({"reply": "stay curious"}));
}

#[tokio::test]
async fn test_every_endpoint_answers_with_its_field() {
    let app = app();
    let cases = [
        ("/youtube-to-notes", json!({"videoUrl": "https://youtu.be/x"}), "notes"),
        ("/generate-notes", json!({"transcript": "t"}), "notes"),
        ("/simplify-doc", json!({"text": "t"}), "reply"),
        ("/api/senior-chat", json!({"seniorId": "jobs", "message": "m"}), "reply"),
        ("/api/style-advice", json!({"shape": "heart"}), "reply"),
        ("/api/analyze-style", json!({"image": tiny_jpeg_base64()}), "reply"),
        ("/api/mega-style", json!({"shape": "diamond"}), "reply"),
        ("/api/legendary-fitness", json!({"messMeal": "dal", "fitnessGoal": "bulk"}), "reply"),
        ("/api/confidence-boost", json!({}), "reply"),
    ];

    for (path, body, field) in cases {
        let response = post_json(&app.router, path, body).await;
        assert_eq!(response.status, StatusCode::OK, "{}", path);
        let object = response.body.as_object().unwrap();
        assert_eq!(object.len(), 1, "{}", path);
        assert!(object[field].is_string(), "{}", path);
    }
}
