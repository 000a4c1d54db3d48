//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure: fixture paths and an
//! in-process router wired to mock backends.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use glowstack::error::{Error, Result};
use glowstack::persona::PersonaRegistry;
use glowstack::provider::{MockConfig, MockProvider, ProviderKind, ProviderSet, RoutingTable};
use glowstack::server::build_router;
use glowstack::transcript::{Transcript, TranscriptSource};
use glowstack::Dispatcher;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Transcript source answering every video with the same result.
pub enum FakeTranscripts {
    Fragments(Vec<&'static str>),
    Refused { status: u16, detail: Option<&'static str> },
    Unreachable,
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch(&self, _video_url: &str) -> Result<Transcript> {
        match self {
            FakeTranscripts::Fragments(fragments) => Ok(Transcript {
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
            }),
            FakeTranscripts::Refused { status, detail } => Err(Error::TranscriptUnavailable {
                status: *status,
                detail: detail.map(String::from),
            }),
            FakeTranscripts::Unreachable => Err(Error::TranscriptFetch {
                message: "connection refused".into(),
            }),
        }
    }
}

/// Router plus handles on the (recording) mocks behind it.
pub struct TestApp {
    pub router: Router,
    pub gemini: Arc<MockProvider>,
    pub groq: Arc<MockProvider>,
}

/// App whose backends echo their request summary.
pub fn app() -> TestApp {
    app_with(MockConfig::default(), MockConfig::default(), FakeTranscripts::Fragments(vec!["arrays", "then", "graphs"]))
}

pub fn app_with(gemini: MockConfig, groq: MockConfig, transcripts: FakeTranscripts) -> TestApp {
    build_app(gemini, groq, transcripts, 50 * 1024 * 1024)
}

/// Default app with a small request body limit.
pub fn app_with_body_limit(body_limit_bytes: usize) -> TestApp {
    build_app(
        MockConfig::default(),
        MockConfig::default(),
        FakeTranscripts::Fragments(vec!["arrays"]),
        body_limit_bytes,
    )
}

fn build_app(gemini: MockConfig, groq: MockConfig, transcripts: FakeTranscripts, body_limit_bytes: usize) -> TestApp {
    let gemini = Arc::new(MockProvider::with_config(gemini.recording()));
    let groq = Arc::new(MockProvider::with_config(groq.recording()));

    let providers = ProviderSet::new()
        .with(ProviderKind::Gemini, gemini.clone())
        .with(ProviderKind::Groq, groq.clone());

    let dispatcher = Dispatcher::new(
        Arc::new(PersonaRegistry::bundled().unwrap()),
        Arc::new(RoutingTable::defaults()),
        providers,
        Arc::new(transcripts),
    )
    .unwrap();

    TestApp {
        router: build_router(dispatcher, body_limit_bytes),
        gemini,
        groq,
    }
}

/// Response pieces the tests look at.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// POST a raw body to `path` and decode the JSON answer.
pub async fn post_raw(router: &Router, path: &str, body: impl Into<Body>) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse { status, headers, body }
}

pub async fn post_json(router: &Router, path: &str, body: Value) -> TestResponse {
    post_raw(router, path, body.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(valid_config_fixture().exists(), "Valid config fixture should exist");
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(invalid_config_fixture().exists(), "Invalid config fixture should exist");
    }
}
