//! Generation providers
//!
//! This module contains the provider abstraction and its implementations:
//! - Gemini (conversational, multimodal)
//! - OpenAI-compatible chat completions (Groq)
//! - Mock (testing and offline development)
//!
//! plus the routing table deciding which provider serves each task.

mod gemini;
pub(crate) mod http;
mod mock;
mod openai;
mod routing;
mod traits;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

pub use gemini::{GeminiProvider, DEFAULT_BASE_URL as GEMINI_BASE_URL};
pub use http::Endpoint;
pub use mock::{MockConfig, MockProvider};
pub use openai::{ChatCompletionsProvider, GROQ_BASE_URL};
pub use routing::{ProviderKind, Route, RoutingTable};
pub use traits::*;

use crate::config::RouterConfig;
use crate::error::{Error, Result};

/// The live provider instances, one per provider kind in use.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: HashMap<ProviderKind, SharedProvider>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests.
    pub fn with(mut self, kind: ProviderKind, provider: SharedProvider) -> Self {
        self.insert(kind, provider);
        self
    }

    pub fn insert(&mut self, kind: ProviderKind, provider: SharedProvider) {
        self.providers.insert(kind, provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SharedProvider> {
        self.providers.get(&kind)
    }

    /// Create an adapter for every provider the routing table uses.
    pub fn from_config(config: &RouterConfig, routes: &RoutingTable) -> Result<Self> {
        let mut set = Self::new();

        for kind in routes.providers_in_use() {
            let provider: SharedProvider = match kind {
                ProviderKind::Gemini => Arc::new(GeminiProvider::new(config.gemini.endpoint())?),
                ProviderKind::Groq => Arc::new(ChatCompletionsProvider::new(
                    "groq",
                    config.groq.endpoint(),
                )?),
                ProviderKind::Mock => Arc::new(MockProvider::new()),
            };
            info!(provider = kind.name(), "Provider ready");
            set.insert(kind, provider);
        }

        Ok(set)
    }

    /// Fail unless every routed provider is present and capable.
    pub fn check_covers(&self, routes: &RoutingTable) -> Result<()> {
        for (task, route) in routes.iter() {
            let provider = self.get(route.provider).ok_or_else(|| {
                Error::config_field_invalid(
                    format!("routing.{}.provider", task),
                    format!("No '{}' provider is configured", route.provider),
                )
            })?;

            if !provider.capabilities().satisfies(task.profile().requires) {
                return Err(Error::config_field_invalid(
                    format!("routing.{}.provider", task),
                    format!("Provider '{}' cannot serve '{}'", provider.name(), task),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&ProviderKind> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("ProviderSet").field("providers", &kinds).finish()
    }
}
