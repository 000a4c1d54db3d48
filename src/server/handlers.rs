use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::{HeaderValue, RETRY_AFTER};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dispatcher::{Dispatcher, OutcomeStatus, TaskOutcome};
use crate::types::{TaskInput, TaskKind};

use super::RETRY_AFTER_SECS;

/// Shared body of every task endpoint.
pub(super) async fn run_task(
    kind: TaskKind,
    State(dispatcher): State<Dispatcher>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(raw) => parse_body(&raw),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            info!(task = %kind, "Request body over the size limit");
            return outcome_response(&TaskOutcome::payload_too_large(kind));
        }
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable request body, treating it as empty");
            Value::Object(Map::new())
        }
    };
    let input = TaskInput::from_json(kind, &body);
    let outcome = dispatcher.dispatch(input).await;
    outcome_response(&outcome)
}

/// Missing or unparsable bodies count as `{}`.
fn parse_body(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Unparsable request body, treating it as empty");
            Value::Object(Map::new())
        }
    }
}

fn status_code(status: OutcomeStatus) -> StatusCode {
    match status {
        OutcomeStatus::Success => StatusCode::OK,
        OutcomeStatus::BadRequest => StatusCode::BAD_REQUEST,
        OutcomeStatus::NotFound => StatusCode::NOT_FOUND,
        OutcomeStatus::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        OutcomeStatus::UpstreamUnavailable(code) => StatusCode::from_u16(code)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        OutcomeStatus::GenerationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render an outcome as `{<field>: text}` with the matching status.
pub fn outcome_response(outcome: &TaskOutcome) -> Response {
    let mut body = Map::new();
    body.insert(
        outcome.response_field().as_str().to_string(),
        Value::String(outcome.text.clone()),
    );

    let mut response = (status_code(outcome.status), Json(Value::Object(body))).into_response();
    if outcome.is_transient() {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
    }
    response
}
