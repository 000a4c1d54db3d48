//! Client-supplied conversation history
//!
//! The server never stores conversations. A persona chat request may carry the
//! turns the client has seen so far, and this module turns that untrusted JSON
//! into an ordered list of tagged turns for a single multi-turn exchange.
//!
//! Accepted turn shapes:
//! - `{"role": "user" | "model" | "assistant", "parts": [{"text": "..."}]}`
//! - `{"role": "user" | "model" | "assistant", "content": "..."}`
//!
//! A history that is not an array, or that contains any turn we cannot read,
//! is replaced by an empty conversation rather than failing the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    fn from_role(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "user" => Some(Speaker::User),
            "model" | "assistant" => Some(Speaker::Assistant),
            _ => None,
        }
    }
}

/// One prior message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered turns for one request. Lives only as long as that request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a history value from a request body.
    ///
    /// `None`, `null`, non-arrays and arrays with any malformed turn all
    /// produce an empty conversation.
    pub fn from_client_value(value: Option<&Value>) -> Self {
        let items = match value {
            None | Some(Value::Null) => return Self::empty(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!(kind = json_kind(other), "History is not an array, ignoring it");
                return Self::empty();
            }
        };

        let mut turns = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            match parse_turn(item) {
                Some(turn) => turns.push(turn),
                None => {
                    warn!(position, "Malformed history turn, ignoring the whole history");
                    return Self::empty();
                }
            }
        }

        Self { turns }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

fn parse_turn(item: &Value) -> Option<ConversationTurn> {
    let object = item.as_object()?;
    let speaker = Speaker::from_role(object.get("role")?.as_str()?)?;

    let content = match (object.get("parts"), object.get("content")) {
        (Some(Value::Array(parts)), _) => {
            let mut text = String::new();
            for part in parts {
                text.push_str(part.as_object()?.get("text")?.as_str()?);
            }
            text
        }
        (None, Some(Value::String(content))) => content.clone(),
        _ => return None,
    };

    Some(ConversationTurn { speaker, content })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
