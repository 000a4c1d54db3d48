//! Task dispatcher
//!
//! Runs one task descriptor through the fixed pipeline:
//! validation → persona lookup → source fetch → prompt assembly →
//! route selection → provider call → outcome.
//!
//! Every failure is caught here and turned into a [`TaskOutcome`] carrying
//! the task's fixed text for that failure. Raw provider errors are logged,
//! never returned. Nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::RouterConfig;
use crate::error::{Error, FailureClass, Result};
use crate::persona::{Persona, PersonaRegistry};
use crate::prompt::{assemble, needs_source_text, AssemblyContext};
use crate::provider::{GenerationRequest, ProviderSet, RoutingTable};
use crate::transcript::{TranscriptApiClient, TranscriptSource};
use crate::types::{require, ResponseField, SessionPolicy, TaskInput, TaskKind};

// ─────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────

/// Text returned under the task's field when its body is over the limit.
pub const PAYLOAD_TOO_LARGE_TEXT: &str = "Request body is too large.";

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    /// A required field was absent or unusable.
    BadRequest,
    /// The persona id did not resolve.
    NotFound,
    /// The request body exceeded the configured limit and was never read.
    PayloadTooLarge,
    /// The transcript service refused, with its HTTP status.
    UpstreamUnavailable(u16),
    /// The backend (or transcript transport) failed.
    GenerationFailed { class: FailureClass },
}

/// Terminal result of one dispatched task. Always carries exactly one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub status: OutcomeStatus,
    pub text: String,
}

impl TaskOutcome {
    pub fn success(kind: TaskKind, text: String) -> Self {
        Self {
            kind,
            status: OutcomeStatus::Success,
            text,
        }
    }

    /// The body was refused by ingress before it reached the pipeline.
    pub fn payload_too_large(kind: TaskKind) -> Self {
        Self::fixed(kind, OutcomeStatus::PayloadTooLarge, PAYLOAD_TOO_LARGE_TEXT)
    }

    fn fixed(kind: TaskKind, status: OutcomeStatus, text: &str) -> Self {
        Self {
            kind,
            status,
            text: text.to_string(),
        }
    }

    /// Map a pipeline error to the task's fixed response.
    pub fn from_error(kind: TaskKind, error: &Error) -> Self {
        let profile = kind.profile();
        match error {
            Error::MissingField { .. } | Error::InvalidField { .. } => {
                Self::fixed(kind, OutcomeStatus::BadRequest, profile.missing_input)
            }
            Error::PersonaNotFound { .. } => Self::fixed(
                kind,
                OutcomeStatus::NotFound,
                profile.not_found.unwrap_or(profile.fallback),
            ),
            Error::TranscriptUnavailable { status, detail } => Self {
                kind,
                status: OutcomeStatus::UpstreamUnavailable(*status),
                text: format!(
                    "### ⚠️ API Error\nReason: {}",
                    detail.as_deref().unwrap_or("Restricted.")
                ),
            },
            other => Self::fixed(
                kind,
                OutcomeStatus::GenerationFailed {
                    class: other.failure_class().unwrap_or(FailureClass::MalformedInput),
                },
                profile.fallback,
            ),
        }
    }

    /// Name of the body field this outcome is returned under.
    pub fn response_field(&self) -> ResponseField {
        self.kind.profile().response_field
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::GenerationFailed {
                class: FailureClass::Transient
            }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────

/// Shared, read-only routing state plus the pipeline that uses it.
#[derive(Clone)]
pub struct Dispatcher {
    personas: Arc<PersonaRegistry>,
    routes: Arc<RoutingTable>,
    providers: ProviderSet,
    transcripts: Arc<dyn TranscriptSource>,
}

impl Dispatcher {
    /// Assemble a dispatcher, failing if a routed provider is missing.
    pub fn new(
        personas: Arc<PersonaRegistry>,
        routes: Arc<RoutingTable>,
        providers: ProviderSet,
        transcripts: Arc<dyn TranscriptSource>,
    ) -> Result<Self> {
        providers.check_covers(&routes)?;
        Ok(Self {
            personas,
            routes,
            providers,
            transcripts,
        })
    }

    /// Build every shared table and client from configuration.
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let personas = PersonaRegistry::load(config.personas.file.as_deref().map(std::path::Path::new))?;
        let routes = RoutingTable::build(&config.routing)?;
        let providers = ProviderSet::from_config(config, &routes)?;
        let transcripts = TranscriptApiClient::new(config.transcript.endpoint())?;

        for (kind, route) in routes.iter() {
            debug!(task = %kind, provider = %route.provider, model = %route.model, "Route");
        }

        Self::new(
            Arc::new(personas),
            Arc::new(routes),
            providers,
            Arc::new(transcripts),
        )
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Run one task to completion. Never fails; errors become outcomes.
    pub async fn dispatch(&self, input: TaskInput) -> TaskOutcome {
        let kind = input.kind();
        let span = info_span!("task", request_id = %Uuid::new_v4(), task = %kind);

        async move {
            let started = Instant::now();
            let outcome = match self.run(&input).await {
                Ok(text) => TaskOutcome::success(kind, text),
                Err(error) => {
                    let outcome = TaskOutcome::from_error(kind, &error);
                    match outcome.status {
                        OutcomeStatus::GenerationFailed { class } => {
                            warn!(%class, error = %error.format_for_log(), "Generation failed")
                        }
                        _ => info!(error = %error.format_for_log(), "Request refused"),
                    }
                    outcome
                }
            };

            info!(
                status = ?outcome.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Task finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, input: &TaskInput) -> Result<String> {
        let kind = input.kind();
        let profile = kind.profile();

        // 1. Validation
        input.validate()?;

        // 2. Persona lookup
        let persona = self.resolve_persona(input)?;

        // 3. Source resolution
        let source_text = if needs_source_text(kind) {
            Some(self.fetch_source(input).await?)
        } else {
            None
        };

        // 4. Prompt assembly
        let payload = assemble(
            input,
            AssemblyContext {
                persona,
                source_text: source_text.as_deref(),
            },
        )?;

        // 5. Provider selection
        let route = self.routes.route(kind);
        let provider = self.providers.get(route.provider).ok_or_else(|| {
            Error::Internal(format!("No provider registered for '{}'", route.provider))
        })?;

        // 6. Invocation
        let request = match (profile.session, input) {
            (SessionPolicy::Conversational, TaskInput::PersonaChat { history, .. }) => {
                GenerationRequest::multi_turn(&route.model, payload, history.clone())
            }
            _ => GenerationRequest::single_shot(&route.model, payload),
        };

        debug!(
            provider = provider.name(),
            model = %route.model,
            turns = request.history().len(),
            image = request.payload.has_image(),
            fingerprint = %request.payload.fingerprint(),
            "Invoking provider"
        );

        let generation = provider.generate(request).await?;
        Ok(generation.text)
    }

    fn resolve_persona(&self, input: &TaskInput) -> Result<Option<&Persona>> {
        match input {
            TaskInput::PersonaChat { senior_id, .. } => {
                let id = senior_id.as_deref().unwrap_or_default();
                self.personas.get(id).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn fetch_source(&self, input: &TaskInput) -> Result<String> {
        let video_url = match input {
            TaskInput::RoadmapFromSourceText { video_url } => {
                require(input.kind(), "videoUrl", video_url)?
            }
            _ => return Err(Error::Internal("source text requested for a non-roadmap task".into())),
        };

        let transcript = self.transcripts.fetch(video_url).await?;
        debug!(fragments = transcript.fragments.len(), "Transcript fetched");
        if transcript.is_blank() {
            return Err(Error::TranscriptFetch {
                message: format!("No caption text for {}", video_url),
            });
        }
        Ok(transcript.text())
    }
}
