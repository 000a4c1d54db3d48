use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::{require, TaskInput, TaskKind};

use super::templates::{self, render};
use super::{InlineImage, PromptPayload, UserContent};

/// MIME type assumed when an image arrives without a data URL header.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// How the simplify task rewrites a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyMode {
    Eli5,
    Bullets,
}

impl SimplifyMode {
    /// Exactly `eli5` selects [`SimplifyMode::Eli5`]; anything else, including nothing, condenses to bullets.
    pub fn from_input(mode: Option<&str>) -> Self {
        match mode {
            Some("eli5") => SimplifyMode::Eli5,
            _ => SimplifyMode::Bullets,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            SimplifyMode::Eli5 => templates::SIMPLIFY_ELI5,
            SimplifyMode::Bullets => templates::SIMPLIFY_BULLETS,
        }
    }
}

/// What the vision task looks at in a selfie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionMode {
    Hair,
    Skin,
    Glasses,
}

impl VisionMode {
    /// Modes match case-sensitively; unknown or missing ones fall back to [`VisionMode::Hair`].
    pub fn from_input(mode: Option<&str>) -> Self {
        match mode {
            Some("skin") => VisionMode::Skin,
            Some("glasses") => VisionMode::Glasses,
            _ => VisionMode::Hair,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            VisionMode::Hair => templates::VISION_HAIR,
            VisionMode::Skin => templates::VISION_SKIN,
            VisionMode::Glasses => templates::VISION_GLASSES,
        }
    }
}

/// Values resolved by the dispatcher before assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyContext<'a> {
    /// Resolved persona, for persona chat.
    pub persona: Option<&'a Persona>,
    /// Fetched source text, for the roadmap task.
    pub source_text: Option<&'a str>,
}

/// Build the prompt for one task.
pub fn assemble(input: &TaskInput, context: AssemblyContext<'_>) -> Result<PromptPayload> {
    let kind = input.kind();
    match input {
        TaskInput::RoadmapFromSourceText { .. } => {
            let source = context
                .source_text
                .ok_or_else(|| Error::Internal("roadmap assembled without source text".into()))?;
            Ok(roadmap(source))
        }
        TaskInput::LectureSummary { transcript } => {
            Ok(lecture_summary(require(kind, "transcript", transcript)?))
        }
        TaskInput::DocumentSimplify { text, mode } => Ok(document_simplify(
            require(kind, "text", text)?,
            SimplifyMode::from_input(mode.as_deref()),
        )),
        TaskInput::PersonaChat {
            senior_id, message, ..
        } => {
            let persona = context.persona.ok_or_else(|| Error::PersonaNotFound {
                id: senior_id.clone().unwrap_or_default(),
            })?;
            Ok(persona_chat(persona, require(kind, "message", message)?))
        }
        TaskInput::StyleAdvice { shape, .. } => Ok(style_advice(require(kind, "shape", shape)?)),
        TaskInput::VisionStyleAnalyze { image, mode } => {
            let image = decode_image(require(kind, "image", image)?)?;
            Ok(vision_style(image, VisionMode::from_input(mode.as_deref())))
        }
        TaskInput::MegaStyleReport { shape, .. } => Ok(mega_style(require(kind, "shape", shape)?)),
        TaskInput::FitnessAdvice {
            mess_meal,
            fitness_goal,
        } => Ok(fitness_advice(
            require(kind, "messMeal", mess_meal)?,
            require(kind, "fitnessGoal", fitness_goal)?,
        )),
        TaskInput::ConfidenceProtocol => Ok(confidence_protocol()),
    }
}

pub fn roadmap(source_text: &str) -> PromptPayload {
    PromptPayload::text(
        Some(templates::GLOW_SCRIBE_SYSTEM.to_string()),
        render(templates::ROADMAP_USER, &[("transcript", source_text)]),
    )
}

pub fn lecture_summary(transcript: &str) -> PromptPayload {
    PromptPayload::text(
        Some(templates::GLOW_SCRIBE_SYSTEM.to_string()),
        render(templates::LECTURE_USER, &[("transcript", transcript)]),
    )
}

pub fn document_simplify(text: &str, mode: SimplifyMode) -> PromptPayload {
    PromptPayload::text(
        Some(templates::GLOW_SCRIBE_SYSTEM.to_string()),
        render(
            templates::SIMPLIFY_USER,
            &[("instruction", mode.instruction()), ("text", text)],
        ),
    )
}

pub fn persona_chat(persona: &Persona, message: &str) -> PromptPayload {
    PromptPayload::text(Some(persona.system_instruction()), message)
}

pub fn style_advice(shape: &str) -> PromptPayload {
    PromptPayload::text(
        Some(templates::STYLE_SYSTEM.to_string()),
        render(templates::STYLE_USER, &[("shape", shape)]),
    )
}

pub fn vision_style(image: InlineImage, mode: VisionMode) -> PromptPayload {
    PromptPayload {
        system: None,
        user: UserContent::Multimodal {
            text: mode.prompt().to_string(),
            image,
        },
    }
}

pub fn mega_style(shape: &str) -> PromptPayload {
    PromptPayload::text(
        Some(render(templates::MEGA_SYSTEM, &[("shape", shape)])),
        render(templates::MEGA_USER, &[("shape", shape)]),
    )
}

pub fn fitness_advice(meal: &str, goal: &str) -> PromptPayload {
    PromptPayload::text(
        Some(templates::FITNESS_SYSTEM.to_string()),
        render(templates::FITNESS_USER, &[("meal", meal), ("goal", goal)]),
    )
}

pub fn confidence_protocol() -> PromptPayload {
    PromptPayload::text(
        Some(templates::CONFIDENCE_SYSTEM.to_string()),
        templates::CONFIDENCE_USER,
    )
}

/// Decode a base64 image, with or without a `data:<mime>;base64,` header.
pub fn decode_image(raw: &str) -> Result<InlineImage> {
    let raw = raw.trim();

    let (mime_type, encoded) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| invalid_image("data URL has no payload"))?;
            let mut params = header.split(';');
            let mime = params.next().unwrap_or_default().trim();
            if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                return Err(invalid_image("data URL is not base64 encoded"));
            }
            let mime = if mime.is_empty() { DEFAULT_IMAGE_MIME } else { mime };
            (mime, body)
        }
        None => (DEFAULT_IMAGE_MIME, raw),
    };

    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| invalid_image(format!("not valid base64: {}", e)))?;

    if data.is_empty() {
        return Err(invalid_image("image is empty"));
    }

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data,
    })
}

fn invalid_image(message: impl Into<String>) -> Error {
    Error::InvalidField {
        field: "image",
        message: message.into(),
    }
}

/// Task kinds whose assembly needs the fetched source text.
pub fn needs_source_text(kind: TaskKind) -> bool {
    kind == TaskKind::RoadmapFromSourceText
}
