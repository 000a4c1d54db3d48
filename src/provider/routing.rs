//! Routing table
//!
//! Maps every task kind to exactly one `(provider, model)` pair. Built once
//! at startup from the defaults plus `[routing.<task>]` overrides; any
//! problem with the overrides is a configuration error, so the table can
//! never send a request to a provider that cannot serve it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RouteOverride;
use crate::error::{Error, Result};
use crate::types::TaskKind;

use super::{gemini, mock, openai, ProviderCapabilities};

pub const GEMINI_FLASH: &str = "gemini-2.5-flash";
pub const GEMINI_VISION: &str = "gemini-2.0-flash";
pub const GROQ_LLAMA: &str = "llama-3.3-70b-versatile";
pub const MOCK_MODEL: &str = "mock";

// ─────────────────────────────────────────────────────────────────
// Provider Kind
// ─────────────────────────────────────────────────────────────────

/// Backends a task can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Gemini `generateContent`
    Gemini,
    /// Groq chat completions
    Groq,
    /// In-process mock (offline development)
    Mock,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Gemini, ProviderKind::Groq, ProviderKind::Mock]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
            ProviderKind::Mock => "mock",
        }
    }

    /// Capabilities of the adapter serving this kind, as declared by the adapter itself
    pub fn capabilities(&self) -> ProviderCapabilities {
        match self {
            ProviderKind::Gemini => gemini::CAPABILITIES,
            ProviderKind::Groq => openai::capabilities(self.name()),
            ProviderKind::Mock => mock::CAPABILITIES,
        }
    }

    /// Model used for `task` when a route names this provider but no model
    pub fn default_model(&self, task: TaskKind) -> &'static str {
        match (self, task) {
            (ProviderKind::Gemini, TaskKind::VisionStyleAnalyze) => GEMINI_VISION,
            (ProviderKind::Gemini, _) => GEMINI_FLASH,
            (ProviderKind::Groq, _) => GROQ_LLAMA,
            (ProviderKind::Mock, _) => MOCK_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "groq" => Ok(ProviderKind::Groq),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!("Unknown provider '{}'. Valid: gemini, groq, mock", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Routing Table
// ─────────────────────────────────────────────────────────────────

/// Where one task kind is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub provider: ProviderKind,
    pub model: String,
}

impl Route {
    fn new(provider: ProviderKind, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
        }
    }
}

/// Task kind -> route, one entry per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    /// Routing used when no overrides are configured.
    pub fn defaults() -> Self {
        let routes = TaskKind::ALL
            .iter()
            .map(|&kind| {
                let provider = match kind {
                    TaskKind::RoadmapFromSourceText
                    | TaskKind::LectureSummary
                    | TaskKind::DocumentSimplify
                    | TaskKind::PersonaChat
                    | TaskKind::VisionStyleAnalyze => ProviderKind::Gemini,
                    TaskKind::StyleAdvice
                    | TaskKind::MegaStyleReport
                    | TaskKind::FitnessAdvice
                    | TaskKind::ConfidenceProtocol => ProviderKind::Groq,
                };
                Route::new(provider, provider.default_model(kind))
            })
            .collect();
        Self { routes }
    }

    /// Apply overrides keyed by task slug on top of the defaults.
    pub fn build(overrides: &BTreeMap<String, RouteOverride>) -> Result<Self> {
        let mut table = Self::defaults();

        for (slug, over) in overrides {
            let field = format!("routing.{}", slug);
            let kind: TaskKind = slug
                .parse()
                .map_err(|e: String| Error::config_field_invalid(field.clone(), e))?;

            let route = &mut table.routes[kind.index()];
            if let Some(ref provider) = over.provider {
                route.provider = provider
                    .parse()
                    .map_err(|e: String| Error::config_field_invalid(format!("{}.provider", field), e))?;
                // A model name only means something to the provider it was chosen for.
                route.model = route.provider.default_model(kind).to_string();
            }
            if let Some(ref model) = over.model {
                if model.trim().is_empty() {
                    return Err(Error::config_field_invalid(
                        format!("{}.model", field),
                        "Model cannot be empty",
                    ));
                }
                route.model = model.trim().to_string();
            }

            let caps = route.provider.capabilities();
            if !caps.satisfies(kind.profile().requires) {
                return Err(Error::config_field_invalid(
                    format!("{}.provider", field),
                    format!(
                        "Provider '{}' cannot serve '{}' (needs {})",
                        route.provider,
                        kind,
                        describe_requirements(kind)
                    ),
                ));
            }
        }

        Ok(table)
    }

    pub fn route(&self, kind: TaskKind) -> &Route {
        &self.routes[kind.index()]
    }

    /// Routes in endpoint order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskKind, &Route)> {
        TaskKind::ALL.iter().copied().zip(self.routes.iter())
    }

    /// Distinct providers referenced by at least one route.
    pub fn providers_in_use(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.routes.iter().map(|r| r.provider).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::defaults()
    }
}

fn describe_requirements(kind: TaskKind) -> &'static str {
    let requires = kind.profile().requires;
    match (requires.multi_turn, requires.multimodal) {
        (true, true) => "multi-turn and image support",
        (true, false) => "multi-turn support",
        (false, true) => "image support",
        (false, false) => "nothing special",
    }
}
