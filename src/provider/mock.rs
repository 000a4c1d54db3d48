//! Mock provider for testing and offline development
//!
//! Replies deterministically and can be told to fail with either failure
//! class. Only a recording mock keeps the requests it receives; the mock
//! routed to by configuration just counts them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, FailureClass, Result};

use super::{Generation, GenerationMode, GenerationProvider, GenerationRequest, ProviderCapabilities};

const NAME: &str = "mock";

pub(super) const CAPABILITIES: ProviderCapabilities = ProviderCapabilities {
    name: NAME,
    multi_turn: true,
    multimodal: true,
};

// ─────────────────────────────────────────────────────────────────
// Mock Provider Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock provider behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fixed reply text (otherwise a reply derived from the request)
    pub reply: Option<String>,

    /// Fail every call with this class
    pub failure: Option<FailureClass>,

    /// Simulated latency per call (ms)
    pub latency_ms: u64,

    /// Keep every request for inspection (tests only, unbounded)
    pub record: bool,
}

impl MockConfig {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Default::default()
        }
    }

    pub fn failing(class: FailureClass) -> Self {
        Self {
            failure: Some(class),
            ..Default::default()
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Provider
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of `GenerationProvider`
pub struct MockProvider {
    config: MockConfig,
    calls: AtomicUsize,
    requests: RwLock<Vec<GenerationRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with default configuration
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Default replies, keeping every request
    pub fn recording() -> Self {
        Self::with_config(MockConfig::default().recording())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Number of `generate` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Every request received, in arrival order. Empty unless recording.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().clone()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.read().last().cloned()
    }

    /// Forget recorded requests and reset the call count
    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.requests.write().clear();
    }

    fn reply_for(&self, request: &GenerationRequest) -> String {
        if let Some(ref reply) = self.config.reply {
            return reply.clone();
        }

        let turns = match &request.mode {
            GenerationMode::SingleShot => 0,
            GenerationMode::MultiTurn(conversation) => conversation.len(),
        };
        format!(
            "[mock:{}] turns={} prompt={}",
            request.model,
            turns,
            &request.payload.fingerprint()[..12]
        )
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        CAPABILITIES
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.config.record {
            self.requests.write().push(request.clone());
        }

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match self.config.failure {
            Some(FailureClass::Transient) => {
                Err(Error::provider_unavailable(NAME, "Simulated overload"))
            }
            Some(FailureClass::MalformedInput) => {
                Err(Error::provider_rejected(NAME, "Simulated rejection"))
            }
            None => Ok(Generation {
                text: self.reply_for(&request),
            }),
        }
    }
}
