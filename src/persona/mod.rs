//! Persona system: mentor identities for the persona-chat task.
//!
//! Personas are loaded once at startup, either from the bundled set or from
//! a TOML file named in the configuration, and are read-only afterwards.

pub mod registry;
pub mod types;

pub use registry::PersonaRegistry;
pub use types::Persona;
