//! OpenAI-compatible chat-completions adapter
//!
//! Used for Groq, and works against any endpoint that speaks the
//! `/chat/completions` protocol. Stateless and text only: multi-turn
//! requests and image content are rejected as malformed input.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompt::UserContent;

use super::http::{build_client, snippet, status_error, transport_error, Endpoint};
use super::{Generation, GenerationMode, GenerationProvider, GenerationRequest, ProviderCapabilities};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// What any chat-completions backend named `name` can do.
pub(super) fn capabilities(name: &'static str) -> ProviderCapabilities {
    ProviderCapabilities {
        name,
        multi_turn: false,
        multimodal: false,
    }
}

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Chat Completions Provider
// ─────────────────────────────────────────────────────────────────

/// Single-shot, text-only backend.
pub struct ChatCompletionsProvider {
    name: &'static str,
    endpoint: Endpoint,
    client: Client,
}

impl ChatCompletionsProvider {
    /// Create an adapter reporting itself as `name` in logs and errors.
    pub fn new(name: &'static str, endpoint: Endpoint) -> Result<Self> {
        let client = build_client(endpoint.timeout)?;
        debug!(provider = name, base_url = %endpoint.base_url, "Chat-completions provider created");
        Ok(Self {
            name,
            endpoint,
            client,
        })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.endpoint.has_api_key() {
            Some(format!("Bearer {}", self.endpoint.api_key))
        } else {
            None
        }
    }

    fn build_messages<'a>(&self, request: &'a GenerationRequest) -> Result<Vec<ChatMessage<'a>>> {
        if let GenerationMode::MultiTurn(_) = request.mode {
            return Err(Error::provider_rejected(
                self.name,
                "Multi-turn conversations are not supported",
            ));
        }

        let user = match &request.payload.user {
            UserContent::Text(text) => text.as_str(),
            UserContent::Multimodal { .. } => {
                return Err(Error::provider_rejected(self.name, "Image content is not supported"));
            }
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.payload.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });
        Ok(messages)
    }
}

#[async_trait]
impl GenerationProvider for ChatCompletionsProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        capabilities(self.name)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: self.build_messages(&request)?,
        };

        let mut req = self
            .client
            .post(self.endpoint.url("chat/completions"))
            .json(&body);
        if let Some(ref auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(|e| transport_error(self.name, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.name, status, &body));
        }

        let raw = response.text().await.map_err(|e| transport_error(self.name, e))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw).map_err(|e| {
            Error::provider_rejected(
                self.name,
                format!("Unreadable response: {} ({})", e, snippet(&raw)),
            )
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider_rejected(self.name, "No choices in API response"))?;

        match choice.message.content {
            Some(text) if !text.is_empty() => {
                debug!(provider = self.name, model = %request.model, chars = text.len(), "Chat completion complete");
                Ok(Generation { text })
            }
            _ => Err(Error::provider_rejected(
                self.name,
                format!(
                    "Empty completion (finish reason: {})",
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ),
            )),
        }
    }
}
