//! Persona registry: bundled defaults or a user-supplied TOML file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

use super::types::{Persona, PersonaFile};

const BUNDLED_PERSONAS: &str = include_str!("../../config/personas.toml");

/// Immutable lookup table of personas, keyed by id.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    /// Personas in file order, for listings.
    personas: Vec<Persona>,

    /// id -> position in `personas`.
    index: HashMap<String, usize>,
}

impl PersonaRegistry {
    /// Registry holding the bundled mentor set.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_PERSONAS)
    }

    /// Load from the configured file, or fall back to the bundled set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Load personas from a TOML file on disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let registry = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            count = registry.len(),
            "Loaded personas"
        );
        Ok(registry)
    }

    /// Parse and validate a persona document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PersonaFile = toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: format!("Invalid persona file: {}", e),
            source: Some(e),
        })?;

        Self::new(file.personas)
    }

    /// Build a registry, rejecting empty or duplicate ids and blank contexts.
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        if personas.is_empty() {
            return Err(Error::config_field_invalid(
                "personas",
                "At least one persona must be defined",
            ));
        }

        let mut index = HashMap::with_capacity(personas.len());
        for (position, persona) in personas.iter().enumerate() {
            if persona.id.trim().is_empty() {
                return Err(Error::config_field_invalid(
                    "personas.id",
                    format!("Persona #{} has an empty id", position + 1),
                ));
            }
            if persona.context.trim().is_empty() {
                return Err(Error::config_field_invalid(
                    "personas.context",
                    format!("Persona '{}' has an empty context", persona.id),
                ));
            }
            if index.insert(persona.id.clone(), position).is_some() {
                return Err(Error::config_field_invalid(
                    "personas.id",
                    format!("Duplicate persona id '{}'", persona.id),
                ));
            }
        }

        debug!(count = personas.len(), "Persona registry ready");
        Ok(Self { personas, index })
    }

    /// Look up a persona by id. Ids are exact-match.
    pub fn resolve(&self, id: &str) -> Option<&Persona> {
        self.index.get(id).map(|&position| &self.personas[position])
    }

    /// Look up a persona, failing with `PersonaNotFound`.
    pub fn get(&self, id: &str) -> Result<&Persona> {
        self.resolve(id).ok_or_else(|| Error::PersonaNotFound { id: id.to_string() })
    }

    /// All personas in declaration order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bundled_set() {
        let registry = PersonaRegistry::bundled().unwrap();
        assert_eq!(registry.len(), 10);

        let ids: Vec<&str> = registry.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "sundar", "elon", "jobs", "ratan", "warren", "ashneer", "deepinder", "aryan",
                "riya", "aditi"
            ]
        );
    }

    #[test]
    fn test_resolve() {
        let registry = PersonaRegistry::bundled().unwrap();
        let ratan = registry.resolve("ratan").unwrap();
        assert_eq!(ratan.name, "Ratan Tata");
        assert!(ratan.system_instruction().starts_with("IDENTITY: You are Ratan Tata."));

        assert!(registry.resolve("nobody").is_none());
        assert!(registry.resolve("Ratan").is_none());
        assert!(matches!(registry.get("nobody"), Err(Error::PersonaNotFound { .. })));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let toml = r#"
            [[persona]]
            id = "a"
            name = "A"
            role = "r"
            context = "You are A."

            [[persona]]
            id = "a"
            name = "A again"
            role = "r"
            context = "You are A again."
        "#;
        let err = PersonaRegistry::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("validation"));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(PersonaRegistry::from_toml_str("").is_err());
    }

    #[test]
    fn test_malformed_file_rejected() {
        let err = PersonaRegistry::from_toml_str("[[persona]]\nid = 3").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[[persona]]\nid = \"coach\"\nname = \"Coach\"\nrole = \"Trainer\"\ncontext = \"You are a coach.\"\n",
        )
        .unwrap();

        let registry = PersonaRegistry::load(Some(file.path())).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("coach").is_some());
        assert!(registry.resolve("elon").is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = PersonaRegistry::load(Some(Path::new("/nonexistent/personas.toml"))).unwrap_err();
        assert!(matches!(err, Error::IoRead { .. }));
    }
}
