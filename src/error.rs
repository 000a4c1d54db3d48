//! Error types for the Glow Stack router
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - Failure classification (transient vs malformed input) for provider errors
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Request errors (3xx)
    MissingField = 300,
    InvalidField = 301,
    PersonaNotFound = 302,

    // Upstream collaborator errors (4xx)
    TranscriptUnavailable = 400,
    TranscriptFetch = 401,

    // Provider errors (5xx)
    ProviderUnavailable = 500,
    ProviderRejected = 501,

    // Server errors (6xx)
    ServerBind = 600,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            600..=699 => 60,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a failed generation call should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Overload, timeout or connection trouble. The same request may succeed later.
    Transient,
    /// The backend refused the input. Resending it unchanged will fail again.
    MalformedInput,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClass::Transient => write!(f, "transient"),
            FailureClass::MalformedInput => write!(f, "malformed-input"),
        }
    }
}

/// Main error type for the router
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure with no more specific context, e.g. the accept loop dying mid-serve
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────

    /// A field the task requires was absent or empty
    #[error("Task '{task}' requires field '{field}'")]
    MissingField { task: &'static str, field: &'static str },

    /// A field was present but unusable
    #[error("Field '{field}' is invalid: {message}")]
    InvalidField { field: &'static str, message: String },

    /// No persona registered under this id
    #[error("Unknown persona: {id}")]
    PersonaNotFound { id: String },

    // ─────────────────────────────────────────────────────────────
    // Upstream Collaborator Errors
    // ─────────────────────────────────────────────────────────────

    /// The transcript service answered with a non-success status
    #[error("Transcript service returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    TranscriptUnavailable { status: u16, detail: Option<String> },

    /// The transcript service could not be reached or answered garbage
    #[error("Transcript fetch failed: {message}")]
    TranscriptFetch { message: String },

    // ─────────────────────────────────────────────────────────────
    // Provider Errors
    // ─────────────────────────────────────────────────────────────

    /// Backend overloaded, timed out or unreachable
    #[error("Provider '{provider}' unavailable: {message}")]
    ProviderUnavailable { provider: &'static str, message: String },

    /// Backend rejected the request or returned no usable content
    #[error("Provider '{provider}' rejected request: {message}")]
    ProviderRejected { provider: &'static str, message: String },

    // ─────────────────────────────────────────────────────────────
    // Server Errors
    // ─────────────────────────────────────────────────────────────

    /// Listener could not be bound
    #[error("Failed to bind {addr}")]
    ServerBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::MissingField { .. } => ErrorCode::MissingField,
            Error::InvalidField { .. } => ErrorCode::InvalidField,
            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,

            Error::TranscriptUnavailable { .. } => ErrorCode::TranscriptUnavailable,
            Error::TranscriptFetch { .. } => ErrorCode::TranscriptFetch,

            Error::ProviderUnavailable { .. } => ErrorCode::ProviderUnavailable,
            Error::ProviderRejected { .. } => ErrorCode::ProviderRejected,

            Error::ServerBind { .. } => ErrorCode::ServerBind,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Classify a generation failure. `None` for errors that are not backend failures.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Error::ProviderUnavailable { .. } | Error::TranscriptFetch { .. } => {
                Some(FailureClass::Transient)
            }
            Error::ProviderRejected { .. } => Some(FailureClass::MalformedInput),
            _ => None,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self.failure_class(), Some(FailureClass::Transient))
            || matches!(self, Error::Io(_) | Error::IoRead { .. } | Error::IoWrite { .. })
    }

    /// Check if the error is fatal (server should not start)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::ServerBind { .. }
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'glowstack config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'glowstack config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values. 'glowstack routes' shows the effective routing table."
            ),
            Error::ServerBind { .. } => Some(
                "Another process may be using this port. Pick a different one with --port."
            ),
            Error::ProviderUnavailable { .. } => Some(
                "The generation backend is busy or unreachable. Check the base URL and try again shortly."
            ),
            Error::ProviderRejected { .. } => Some(
                "The backend refused the request. Verify the API key and model name in the configuration."
            ),
            Error::TranscriptUnavailable { .. } => Some(
                "The video may have captions disabled or be region-restricted."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a transient provider failure
    pub fn provider_unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Error::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    /// Create a non-retryable provider failure
    pub fn provider_rejected(provider: &'static str, message: impl Into<String>) -> Self {
        Error::ProviderRejected {
            provider,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
