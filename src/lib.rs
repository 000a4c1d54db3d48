//! Glow Stack router
//!
//! Accepts task requests over HTTP, assembles prompts from fixed templates
//! and a persona registry, and routes each task to one generation backend.

pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod persona;
pub mod prompt;
pub mod provider;
pub mod server;
pub mod transcript;
pub mod types;
pub mod version;

pub use config::RouterConfig;
pub use dispatcher::{Dispatcher, OutcomeStatus, TaskOutcome};
pub use error::{Error, Result};
