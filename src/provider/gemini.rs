//! Gemini `generateContent` adapter
//!
//! Supports per-call system instructions, multi-turn history and inline
//! images. History turns are sent as `contents` entries ahead of the new
//! user content, so a multi-turn call with no history is the same request
//! as a single-shot call.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversation::{ConversationTurn, Speaker};
use crate::error::{Error, Result};
use crate::prompt::{PromptPayload, UserContent};

use super::http::{build_client, snippet, status_error, transport_error, Endpoint};
use super::{Generation, GenerationProvider, GenerationRequest, ProviderCapabilities};

const NAME: &str = "gemini";

pub(super) const CAPABILITIES: ProviderCapabilities = ProviderCapabilities {
    name: NAME,
    multi_turn: true,
    multimodal: true,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ─────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, PartialEq)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: Blob },
}

#[derive(Debug, Serialize, PartialEq)]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Gemini Provider
// ─────────────────────────────────────────────────────────────────

/// Conversational, multimodal backend.
pub struct GeminiProvider {
    endpoint: Endpoint,
    client: Client,
}

impl GeminiProvider {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let client = build_client(endpoint.timeout)?;
        debug!(base_url = %endpoint.base_url, "Gemini provider created");
        Ok(Self { endpoint, client })
    }

    fn url(&self, model: &str) -> String {
        self.endpoint.url(&format!("models/{}:generateContent", model))
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request.history().iter().map(history_content).collect();
        contents.push(user_content(&request.payload));

        GenerateContentRequest {
            contents,
            system_instruction: request.payload.system.as_ref().map(|system| SystemInstruction {
                parts: vec![Part::Text {
                    text: system.clone(),
                }],
            }),
        }
    }
}

fn role(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "user",
        Speaker::Assistant => "model",
    }
}

fn history_content(turn: &ConversationTurn) -> Content {
    Content {
        role: role(turn.speaker),
        parts: vec![Part::Text {
            text: turn.content.clone(),
        }],
    }
}

fn user_content(payload: &PromptPayload) -> Content {
    let parts = match &payload.user {
        UserContent::Text(text) => vec![Part::Text { text: text.clone() }],
        UserContent::Multimodal { text, image } => vec![
            Part::Text { text: text.clone() },
            Part::InlineData {
                inline_data: Blob {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            },
        ],
    };
    Content { role: "user", parts }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(Error::provider_rejected(NAME, format!("Prompt blocked: {}", reason)));
        }
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(Error::provider_rejected(
            NAME,
            format!("Empty response (finish reason: {})", reason),
        ));
    }

    Ok(text)
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        CAPABILITIES
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        let body = Self::build_body(&request);

        let mut req = self.client.post(self.url(&request.model)).json(&body);
        if self.endpoint.has_api_key() {
            req = req.header("x-goog-api-key", &self.endpoint.api_key);
        }

        let response = req.send().await.map_err(|e| transport_error(NAME, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(NAME, status, &body));
        }

        let raw = response.text().await.map_err(|e| transport_error(NAME, e))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw).map_err(|e| {
            Error::provider_rejected(NAME, format!("Unreadable response: {} ({})", e, snippet(&raw)))
        })?;

        let text = extract_text(parsed)?;
        debug!(model = %request.model, chars = text.len(), "Gemini generation complete");
        Ok(Generation { text })
    }
}
