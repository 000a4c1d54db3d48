//! Core types for the persona system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prompt::templates;

/// A named mentor identity used to steer the persona-chat task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Lookup key sent by clients as `seniorId`.
    pub id: String,

    /// Display name (e.g. "Ratan Tata").
    pub name: String,

    /// Short role line shown in listings.
    pub role: String,

    /// Identity text injected into the system instruction.
    pub context: String,
}

impl Persona {
    /// System instruction that frames a persona chat.
    pub fn system_instruction(&self) -> String {
        templates::render(templates::PERSONA_SYSTEM, &[("context", &self.context)])
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}

/// On-disk layout of a persona file: a list of `[[persona]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PersonaFile {
    #[serde(default, rename = "persona")]
    pub personas: Vec<Persona>,
}
