//! Task descriptors built from inbound request bodies
//!
//! Bodies are read as loose JSON and mapped onto the fields each task knows
//! about. Field names follow the public endpoint contract (`seniorId`,
//! `messMeal`, ...). A field counts as present only if it is a string with
//! non-whitespace content; anything else is treated as absent.

use serde_json::Value;

use crate::conversation::Conversation;
use crate::error::{Error, Result};

use super::TaskKind;

/// Raw, per-task input fields for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskInput {
    RoadmapFromSourceText {
        video_url: Option<String>,
    },
    LectureSummary {
        transcript: Option<String>,
    },
    DocumentSimplify {
        text: Option<String>,
        mode: Option<String>,
    },
    PersonaChat {
        senior_id: Option<String>,
        message: Option<String>,
        history: Conversation,
    },
    StyleAdvice {
        shape: Option<String>,
        mode: Option<String>,
    },
    VisionStyleAnalyze {
        image: Option<String>,
        mode: Option<String>,
    },
    MegaStyleReport {
        shape: Option<String>,
        mode: Option<String>,
    },
    FitnessAdvice {
        mess_meal: Option<String>,
        fitness_goal: Option<String>,
    },
    ConfidenceProtocol,
}

impl TaskInput {
    /// Map a request body onto the fields of `kind`. Never fails.
    pub fn from_json(kind: TaskKind, body: &Value) -> Self {
        match kind {
            TaskKind::RoadmapFromSourceText => TaskInput::RoadmapFromSourceText {
                video_url: text_field(body, "videoUrl"),
            },
            TaskKind::LectureSummary => TaskInput::LectureSummary {
                transcript: text_field(body, "transcript"),
            },
            TaskKind::DocumentSimplify => TaskInput::DocumentSimplify {
                text: text_field(body, "text"),
                mode: text_field(body, "mode"),
            },
            TaskKind::PersonaChat => TaskInput::PersonaChat {
                senior_id: text_field(body, "seniorId"),
                message: text_field(body, "message"),
                history: Conversation::from_client_value(body.get("history")),
            },
            TaskKind::StyleAdvice => TaskInput::StyleAdvice {
                shape: text_field(body, "shape"),
                mode: text_field(body, "mode"),
            },
            TaskKind::VisionStyleAnalyze => TaskInput::VisionStyleAnalyze {
                image: text_field(body, "image"),
                mode: text_field(body, "mode"),
            },
            TaskKind::MegaStyleReport => TaskInput::MegaStyleReport {
                shape: text_field(body, "shape"),
                mode: text_field(body, "mode"),
            },
            TaskKind::FitnessAdvice => TaskInput::FitnessAdvice {
                mess_meal: text_field(body, "messMeal"),
                fitness_goal: text_field(body, "fitnessGoal"),
            },
            TaskKind::ConfidenceProtocol => TaskInput::ConfidenceProtocol,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskInput::RoadmapFromSourceText { .. } => TaskKind::RoadmapFromSourceText,
            TaskInput::LectureSummary { .. } => TaskKind::LectureSummary,
            TaskInput::DocumentSimplify { .. } => TaskKind::DocumentSimplify,
            TaskInput::PersonaChat { .. } => TaskKind::PersonaChat,
            TaskInput::StyleAdvice { .. } => TaskKind::StyleAdvice,
            TaskInput::VisionStyleAnalyze { .. } => TaskKind::VisionStyleAnalyze,
            TaskInput::MegaStyleReport { .. } => TaskKind::MegaStyleReport,
            TaskInput::FitnessAdvice { .. } => TaskKind::FitnessAdvice,
            TaskInput::ConfidenceProtocol => TaskKind::ConfidenceProtocol,
        }
    }

    /// Required fields as `(wire name, value)` pairs.
    ///
    /// `seniorId` is deliberately absent: a missing id is a persona miss
    /// (404), not a bad request.
    fn required(&self) -> Vec<(&'static str, &Option<String>)> {
        match self {
            TaskInput::RoadmapFromSourceText { video_url } => vec![("videoUrl", video_url)],
            TaskInput::LectureSummary { transcript } => vec![("transcript", transcript)],
            TaskInput::DocumentSimplify { text, .. } => vec![("text", text)],
            TaskInput::PersonaChat { message, .. } => vec![("message", message)],
            TaskInput::StyleAdvice { shape, .. } => vec![("shape", shape)],
            TaskInput::VisionStyleAnalyze { image, .. } => vec![("image", image)],
            TaskInput::MegaStyleReport { shape, .. } => vec![("shape", shape)],
            TaskInput::FitnessAdvice {
                mess_meal,
                fitness_goal,
            } => vec![("messMeal", mess_meal), ("fitnessGoal", fitness_goal)],
            TaskInput::ConfidenceProtocol => Vec::new(),
        }
    }

    /// Check that every required field is present.
    pub fn validate(&self) -> Result<()> {
        match self.required().into_iter().find(|(_, value)| value.is_none()) {
            Some((field, _)) => Err(Error::MissingField {
                task: self.kind().slug(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Fetch a required field, reporting it as missing for `task`.
pub fn require<'a>(task: TaskKind, field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    value.as_deref().ok_or(Error::MissingField {
        task: task.slug(),
        field,
    })
}

fn text_field(body: &Value, name: &str) -> Option<String> {
    body.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_wire_names() {
        let input = TaskInput::from_json(
            TaskKind::FitnessAdvice,
            &json!({"messMeal": "rajma chawal", "fitnessGoal": "bulk"}),
        );
        assert_eq!(
            input,
            TaskInput::FitnessAdvice {
                mess_meal: Some("rajma chawal".into()),
                fitness_goal: Some("bulk".into()),
            }
        );
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_blank_and_non_string_fields_are_absent() {
        let input = TaskInput::from_json(TaskKind::LectureSummary, &json!({"transcript": "   "}));
        assert_eq!(input, TaskInput::LectureSummary { transcript: None });

        let input = TaskInput::from_json(TaskKind::StyleAdvice, &json!({"shape": 7}));
        assert_eq!(input, TaskInput::StyleAdvice { shape: None, mode: None });
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let input = TaskInput::from_json(TaskKind::FitnessAdvice, &json!({"messMeal": "poha"}));
        match input.validate() {
            Err(Error::MissingField { task, field }) => {
                assert_eq!(task, "fitness-advice");
                assert_eq!(field, "fitnessGoal");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_transcript_is_bad_request() {
        let input = TaskInput::from_json(TaskKind::LectureSummary, &json!({}));
        assert!(matches!(input.validate(), Err(Error::MissingField { field: "transcript", .. })));
    }

    #[test]
    fn test_persona_chat_without_senior_id_still_validates() {
        let input = TaskInput::from_json(TaskKind::PersonaChat, &json!({"message": "hi"}));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_confidence_needs_nothing() {
        let input = TaskInput::from_json(TaskKind::ConfidenceProtocol, &Value::Null);
        assert!(input.validate().is_ok());
        assert_eq!(input.kind(), TaskKind::ConfidenceProtocol);
    }

    #[test]
    fn test_kind_round_trips_for_every_task() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskInput::from_json(kind, &json!({})).kind(), kind);
        }
    }
}
