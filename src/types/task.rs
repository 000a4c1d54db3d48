//! Task kinds and their static profiles
//!
//! Every endpoint the router exposes corresponds to exactly one [`TaskKind`].
//! Everything that varies per task at the HTTP boundary (path, response field,
//! fallback text) lives in the [`TaskProfile`] table so the dispatcher and the
//! server never hard-code per-task strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Task Kind
// ─────────────────────────────────────────────────────────────────

/// The closed set of tasks the router knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Turn a video's transcript into a study roadmap.
    RoadmapFromSourceText,
    /// Summarize a live lecture transcript into bullet points.
    LectureSummary,
    /// Simplify a document (ELI5 or bullet condense).
    DocumentSimplify,
    /// Chat with a mentor persona, optionally continuing a conversation.
    PersonaChat,
    /// Hairstyle advice for a face shape.
    StyleAdvice,
    /// Analyze a selfie for hair, skin or glasses advice.
    VisionStyleAnalyze,
    /// Full grooming report for a face shape.
    MegaStyleReport,
    /// Mess-food and dorm workout advice.
    FitnessAdvice,
    /// Daily confidence protocol.
    ConfidenceProtocol,
}

impl TaskKind {
    /// All task kinds in endpoint order.
    pub const ALL: [TaskKind; 9] = [
        TaskKind::RoadmapFromSourceText,
        TaskKind::LectureSummary,
        TaskKind::DocumentSimplify,
        TaskKind::PersonaChat,
        TaskKind::StyleAdvice,
        TaskKind::VisionStyleAnalyze,
        TaskKind::MegaStyleReport,
        TaskKind::FitnessAdvice,
        TaskKind::ConfidenceProtocol,
    ];

    /// Position in [`TaskKind::ALL`], used to index per-task tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static profile for this task.
    pub fn profile(self) -> &'static TaskProfile {
        &PROFILES[self.index()]
    }

    /// Kebab-case identifier used in config files and logs.
    pub fn slug(self) -> &'static str {
        self.profile().slug
    }

    /// HTTP path of the endpoint serving this task.
    pub fn path(self) -> &'static str {
        self.profile().path
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        TaskKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = TaskKind::ALL.iter().map(|k| k.slug()).collect();
                format!("Unknown task kind '{}'. Valid: {}", s, valid.join(", "))
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Profile
// ─────────────────────────────────────────────────────────────────

/// Name of the single text field a task's response body carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseField {
    Notes,
    Reply,
}

impl ResponseField {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseField::Notes => "notes",
            ResponseField::Reply => "reply",
        }
    }
}

/// Whether a task is sent as one standalone prompt or continues a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPolicy {
    Stateless,
    Conversational,
}

/// What a provider must be able to do to serve a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequiredCapabilities {
    pub multi_turn: bool,
    pub multimodal: bool,
}

/// Everything the boundary needs to know about a task.
#[derive(Debug)]
pub struct TaskProfile {
    pub kind: TaskKind,
    pub slug: &'static str,
    pub path: &'static str,
    pub response_field: ResponseField,
    /// Returned with 400 when a required input field is absent.
    pub missing_input: &'static str,
    /// Returned with 404 when a persona lookup misses. Only persona-scoped tasks have one.
    pub not_found: Option<&'static str>,
    /// Returned with 500 when generation fails.
    pub fallback: &'static str,
    pub session: SessionPolicy,
    pub requires: RequiredCapabilities,
}

const TEXT_ONLY: RequiredCapabilities = RequiredCapabilities {
    multi_turn: false,
    multimodal: false,
};

static PROFILES: [TaskProfile; 9] = [
    TaskProfile {
        kind: TaskKind::RoadmapFromSourceText,
        slug: "roadmap-from-source-text",
        path: "/youtube-to-notes",
        response_field: ResponseField::Notes,
        missing_input: "No video link provided.",
        not_found: None,
        fallback: "Server Error.",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::LectureSummary,
        slug: "lecture-summary",
        path: "/generate-notes",
        response_field: ResponseField::Notes,
        missing_input: "No audio detected.",
        not_found: None,
        fallback: "Processing failed.",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::DocumentSimplify,
        slug: "document-simplify",
        path: "/simplify-doc",
        response_field: ResponseField::Reply,
        missing_input: "No text to simplify.",
        not_found: None,
        fallback: "Could not simplify.",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::PersonaChat,
        slug: "persona-chat",
        path: "/api/senior-chat",
        response_field: ResponseField::Reply,
        missing_input: "Say something to your mentor first.",
        not_found: Some("Mentor not found."),
        fallback: "I lost connection.",
        session: SessionPolicy::Conversational,
        requires: RequiredCapabilities {
            multi_turn: true,
            multimodal: false,
        },
    },
    TaskProfile {
        kind: TaskKind::StyleAdvice,
        slug: "style-advice",
        path: "/api/style-advice",
        response_field: ResponseField::Reply,
        missing_input: "Tell me your face shape first.",
        not_found: None,
        fallback: "Groq is busy!",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::VisionStyleAnalyze,
        slug: "vision-style-analyze",
        path: "/api/analyze-style",
        response_field: ResponseField::Reply,
        missing_input: "No image received. Snap a selfie and try again!",
        not_found: None,
        fallback: "Vision is rate-limited. Try again later!",
        session: SessionPolicy::Stateless,
        requires: RequiredCapabilities {
            multi_turn: false,
            multimodal: true,
        },
    },
    TaskProfile {
        kind: TaskKind::MegaStyleReport,
        slug: "mega-style-report",
        path: "/api/mega-style",
        response_field: ResponseField::Reply,
        missing_input: "Tell me your face shape first.",
        not_found: None,
        fallback: "Groq is currently busy. Try again!",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::FitnessAdvice,
        slug: "fitness-advice",
        path: "/api/legendary-fitness",
        response_field: ResponseField::Reply,
        missing_input: "Tell the coach what you ate and what you're training for.",
        not_found: None,
        fallback: "The Legendary Coach is currently lifting. Try again!",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
    TaskProfile {
        kind: TaskKind::ConfidenceProtocol,
        slug: "confidence-protocol",
        path: "/api/confidence-boost",
        response_field: ResponseField::Reply,
        missing_input: "Nothing to work with.",
        not_found: None,
        fallback: "Stay strong. Even the AI needs a break sometimes.",
        session: SessionPolicy::Stateless,
        requires: TEXT_ONLY,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_line_up_with_kinds() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.profile().kind, kind, "profile table out of order at {:?}", kind);
        }
    }

    #[test]
    fn test_paths_and_slugs_unique() {
        let mut paths: Vec<&str> = TaskKind::ALL.iter().map(|k| k.path()).collect();
        let mut slugs: Vec<&str> = TaskKind::ALL.iter().map(|k| k.slug()).collect();
        paths.sort_unstable();
        paths.dedup();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(paths.len(), TaskKind::ALL.len());
        assert_eq!(slugs.len(), TaskKind::ALL.len());
    }

    #[test]
    fn test_response_fields() {
        assert_eq!(TaskKind::RoadmapFromSourceText.profile().response_field, ResponseField::Notes);
        assert_eq!(TaskKind::LectureSummary.profile().response_field, ResponseField::Notes);
        for kind in [TaskKind::PersonaChat, TaskKind::DocumentSimplify, TaskKind::ConfidenceProtocol] {
            assert_eq!(kind.profile().response_field, ResponseField::Reply);
        }
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(TaskKind::PersonaChat.profile().not_found, Some("Mentor not found."));
        assert_eq!(TaskKind::StyleAdvice.profile().not_found, None);
        assert_eq!(TaskKind::LectureSummary.profile().missing_input, "No audio detected.");
        assert_eq!(TaskKind::MegaStyleReport.profile().fallback, "Groq is currently busy. Try again!");
    }

    #[test]
    fn test_only_persona_chat_is_conversational() {
        for kind in TaskKind::ALL {
            let conversational = kind.profile().session == SessionPolicy::Conversational;
            assert_eq!(conversational, kind == TaskKind::PersonaChat);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("persona-chat".parse::<TaskKind>().unwrap(), TaskKind::PersonaChat);
        assert_eq!("STYLE_ADVICE".parse::<TaskKind>().unwrap(), TaskKind::StyleAdvice);
        assert!("teleport".parse::<TaskKind>().is_err());
    }
}
