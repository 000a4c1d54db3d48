//! Prompt assembly
//!
//! Pure functions turning a task's input fields into a [`PromptPayload`]:
//! an optional system instruction plus user content, which may carry one
//! inline image. Payloads are derived per request and never stored.

mod assembler;
pub mod templates;

pub use assembler::*;

use sha2::{Digest, Sha256};

/// Image bytes forwarded to a multimodal backend without decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The user half of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserContent {
    Text(String),
    Multimodal { text: String, image: InlineImage },
}

impl UserContent {
    pub fn text(&self) -> &str {
        match self {
            UserContent::Text(text) | UserContent::Multimodal { text, .. } => text,
        }
    }

    pub fn image(&self) -> Option<&InlineImage> {
        match self {
            UserContent::Text(_) => None,
            UserContent::Multimodal { image, .. } => Some(image),
        }
    }
}

/// A finished instruction ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: Option<String>,
    pub user: UserContent,
}

impl PromptPayload {
    pub fn text(system: Option<String>, user: impl Into<String>) -> Self {
        Self {
            system,
            user: UserContent::Text(user.into()),
        }
    }

    pub fn has_image(&self) -> bool {
        self.user.image().is_some()
    }

    /// Hex SHA-256 over every byte that reaches the backend.
    ///
    /// Logged in place of the prompt text.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match &self.system {
            Some(system) => {
                hasher.update([1u8]);
                hasher.update((system.len() as u64).to_le_bytes());
                hasher.update(system.as_bytes());
            }
            None => hasher.update([0u8]),
        }

        let text = self.user.text();
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());

        if let Some(image) = self.user.image() {
            hasher.update(image.mime_type.as_bytes());
            hasher.update([0u8]);
            hasher.update(&image.data);
        }

        hex::encode(hasher.finalize())
    }
}
