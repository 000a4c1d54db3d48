//! Provider trait definitions
//!
//! Defines the `GenerationProvider` trait every generation backend adapter
//! implements. The dispatcher only ever talks to this trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::conversation::Conversation;
use crate::error::Result;
use crate::prompt::PromptPayload;
use crate::types::RequiredCapabilities;

// ─────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────

/// What an adapter can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Name of the provider
    pub name: &'static str,

    /// Accepts prior conversation turns
    pub multi_turn: bool,

    /// Accepts inline images
    pub multimodal: bool,
}

impl ProviderCapabilities {
    /// Whether this provider can serve a task with the given requirements.
    pub fn satisfies(&self, required: RequiredCapabilities) -> bool {
        (!required.multi_turn || self.multi_turn) && (!required.multimodal || self.multimodal)
    }
}

// ─────────────────────────────────────────────────────────────────
// Requests & Results
// ─────────────────────────────────────────────────────────────────

/// How the payload is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// One standalone prompt.
    SingleShot,
    /// Continue the given conversation with the payload's user content.
    MultiTurn(Conversation),
}

/// One call to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Backend model id (e.g. "gemini-2.5-flash")
    pub model: String,

    /// Assembled prompt
    pub payload: PromptPayload,

    /// Single-shot or multi-turn
    pub mode: GenerationMode,
}

impl GenerationRequest {
    pub fn single_shot(model: impl Into<String>, payload: PromptPayload) -> Self {
        Self {
            model: model.into(),
            payload,
            mode: GenerationMode::SingleShot,
        }
    }

    pub fn multi_turn(model: impl Into<String>, payload: PromptPayload, history: Conversation) -> Self {
        Self {
            model: model.into(),
            payload,
            mode: GenerationMode::MultiTurn(history),
        }
    }

    /// Prior turns, empty for single-shot requests.
    pub fn history(&self) -> &[crate::conversation::ConversationTurn] {
        match &self.mode {
            GenerationMode::SingleShot => &[],
            GenerationMode::MultiTurn(conversation) => conversation.turns(),
        }
    }
}

/// Successful generation output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
}

// ─────────────────────────────────────────────────────────────────
// Provider Trait
// ─────────────────────────────────────────────────────────────────

/// A generation backend.
///
/// Implementations never retry. Failures are reported as
/// `Error::ProviderUnavailable` (transient) or `Error::ProviderRejected`
/// (malformed input), see [`crate::error::Error::failure_class`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &'static str;

    /// What this provider accepts
    fn capabilities(&self) -> ProviderCapabilities;

    /// Produce text for one request
    async fn generate(&self, request: GenerationRequest) -> Result<Generation>;
}

/// Thread-safe provider handle
pub type SharedProvider = Arc<dyn GenerationProvider>;
