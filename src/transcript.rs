//! Transcript collaborator
//!
//! The roadmap task needs a video's caption text before it can build a
//! prompt. This module consumes the third-party transcript service's HTTP
//! contract and nothing more:
//!
//! `GET {base}/youtube/transcript?video_url=<url>&format=json`, bearer auth,
//! success body `{"transcript": [{"text": ...}, ...]}`, failure body may
//! carry `{"detail": ...}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::provider::http::{build_client, snippet};
use crate::provider::Endpoint;

pub const DEFAULT_BASE_URL: &str = "https://transcriptapi.com/api/v2";

/// Caption fragments in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub fragments: Vec<String>,
}

impl Transcript {
    /// Fragments joined with single spaces.
    pub fn text(&self) -> String {
        self.fragments.join(" ")
    }

    /// No fragment carries any caption text.
    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }
}

/// Anything that can turn a video link into a transcript.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `video_url`.
    ///
    /// A non-success answer is `Error::TranscriptUnavailable` carrying the
    /// collaborator's status; transport trouble is `Error::TranscriptFetch`.
    async fn fetch(&self, video_url: &str) -> Result<Transcript>;
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    transcript: Vec<Fragment>,
}

#[derive(Debug, Deserialize)]
struct Fragment {
    #[serde(default)]
    text: String,
}

/// HTTP client for the transcript service.
pub struct TranscriptApiClient {
    endpoint: Endpoint,
    client: Client,
}

impl TranscriptApiClient {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let client = build_client(endpoint.timeout)?;
        Ok(Self { endpoint, client })
    }

    fn request_url(&self, video_url: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint.url("youtube/transcript"),
            &[("video_url", video_url), ("format", "json")],
        )
        .map_err(|e| Error::TranscriptFetch {
            message: format!("Invalid transcript endpoint: {}", e),
        })
    }
}

#[async_trait]
impl TranscriptSource for TranscriptApiClient {
    async fn fetch(&self, video_url: &str) -> Result<Transcript> {
        let url = self.request_url(video_url)?;
        debug!(video_url, "Fetching transcript");

        let mut req = self.client.get(url);
        if self.endpoint.has_api_key() {
            req = req.bearer_auth(&self.endpoint.api_key);
        }

        let response = req.send().await.map_err(|e| Error::TranscriptFetch {
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| Error::TranscriptFetch {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(Error::TranscriptUnavailable {
                status: status.as_u16(),
                detail: failure_detail(&body),
            });
        }

        parse_transcript(&body)
    }
}

fn parse_transcript(body: &str) -> Result<Transcript> {
    let parsed: TranscriptResponse = serde_json::from_str(body).map_err(|e| Error::TranscriptFetch {
        message: format!("Unreadable transcript: {} ({})", e, snippet(body)),
    })?;

    let transcript = Transcript {
        fragments: parsed.transcript.into_iter().map(|f| f.text).collect(),
    };
    if transcript.is_blank() {
        return Err(Error::TranscriptFetch {
            message: "Transcript has no caption text".into(),
        });
    }
    Ok(transcript)
}

/// The `detail` of an error body, if any.
fn failure_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
