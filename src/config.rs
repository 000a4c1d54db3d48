//! Configuration system for the Glow Stack router
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (GLOWSTACK_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::provider::{Endpoint, RoutingTable, GEMINI_BASE_URL, GROQ_BASE_URL};

/// Main router configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// HTTP listener settings
    pub server: ServerSettings,

    /// Gemini backend
    pub gemini: GeminiSettings,

    /// Groq backend
    pub groq: GroqSettings,

    /// Transcript service
    pub transcript: TranscriptSettings,

    /// Persona source
    pub personas: PersonaSettings,

    /// Per-task route overrides, keyed by task slug
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub routing: BTreeMap<String, RouteOverride>,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Maximum request body size in MB
    pub body_limit_mb: usize,

    /// Runtime worker threads (0 = one per CPU)
    pub worker_threads: usize,
}

/// Gemini `generateContent` settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Groq chat-completions settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Transcript service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Persona source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// TOML file replacing the bundled personas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Override for one task's route. Unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: usize,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_mb: 50,
            worker_threads: 0,
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            base_url: crate::transcript::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl GeminiSettings {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.base_url, &self.api_key, self.timeout_secs)
    }
}

impl GroqSettings {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.base_url, &self.api_key, self.timeout_secs)
    }
}

impl TranscriptSettings {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.base_url, &self.api_key, self.timeout_secs)
    }
}

impl RouterConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = Self::from_toml_str(&content)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document without validating it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        for path in search_paths() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. `GLOWSTACK_*` names win over the
    /// bare credential names (`GEMINI_API_KEY`, `PORT`, ...).
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

        // Server settings
        if let Some(val) = first(&["GLOWSTACK_HOST"]) {
            self.server.host = val;
        }
        if let Some(n) = first(&["GLOWSTACK_PORT", "PORT"]).and_then(|v| v.parse().ok()) {
            self.server.port = n;
        }
        if let Some(n) = first(&["GLOWSTACK_BODY_LIMIT_MB"]).and_then(|v| v.parse().ok()) {
            self.server.body_limit_mb = n;
        }
        if let Some(n) = first(&["GLOWSTACK_WORKER_THREADS"]).and_then(|v| v.parse().ok()) {
            self.server.worker_threads = n;
        }

        // Backends
        if let Some(val) = first(&["GLOWSTACK_GEMINI_API_KEY", "GEMINI_API_KEY"]) {
            self.gemini.api_key = val;
        }
        if let Some(val) = first(&["GLOWSTACK_GEMINI_BASE_URL"]) {
            self.gemini.base_url = val;
        }
        if let Some(val) = first(&["GLOWSTACK_GROQ_API_KEY", "GROQ_API_KEY"]) {
            self.groq.api_key = val;
        }
        if let Some(val) = first(&["GLOWSTACK_GROQ_BASE_URL"]) {
            self.groq.base_url = val;
        }
        if let Some(val) = first(&["GLOWSTACK_TRANSCRIPT_API_KEY", "TRANSCRIPT_API_KEY"]) {
            self.transcript.api_key = val;
        }
        if let Some(val) = first(&["GLOWSTACK_TRANSCRIPT_BASE_URL"]) {
            self.transcript.base_url = val;
        }

        // Personas
        if let Some(val) = first(&["GLOWSTACK_PERSONAS_FILE"]) {
            self.personas.file = Some(val);
        }

        // Logging settings
        if let Some(val) = first(&["GLOWSTACK_LOG_LEVEL"]) {
            self.logging.level = val;
        }
        if let Some(val) = first(&["GLOWSTACK_LOG_FILE"]) {
            self.logging.file = Some(val);
        }
        if let Some(val) = first(&["GLOWSTACK_LOG_JSON"]) {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.personas.file {
            self.personas.file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config_field_invalid("server.host", "Host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(Error::config_field_invalid("server.port", "Port must be non-zero"));
        }
        if self.server.body_limit_mb == 0 {
            return Err(Error::config_field_invalid(
                "server.body_limit_mb",
                "Body limit must be at least 1 MB",
            ));
        }

        validate_endpoint("gemini", &self.gemini.base_url, self.gemini.timeout_secs)?;
        validate_endpoint("groq", &self.groq.base_url, self.groq.timeout_secs)?;
        validate_endpoint("transcript", &self.transcript.base_url, self.transcript.timeout_secs)?;

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        RoutingTable::build(&self.routing)?;

        Ok(())
    }

    /// Sections whose API key is empty but which the routing table uses
    pub fn missing_credentials(&self, routes: &RoutingTable) -> Vec<&'static str> {
        use crate::provider::ProviderKind;

        let mut missing = Vec::new();
        for kind in routes.providers_in_use() {
            let key = match kind {
                ProviderKind::Gemini => &self.gemini.api_key,
                ProviderKind::Groq => &self.groq.api_key,
                ProviderKind::Mock => continue,
            };
            if key.trim().is_empty() {
                missing.push(kind.name());
            }
        }
        if self.transcript.api_key.trim().is_empty() {
            missing.push("transcript");
        }
        missing
    }

    /// Copy with API keys masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for key in [
            &mut copy.gemini.api_key,
            &mut copy.groq.api_key,
            &mut copy.transcript.api_key,
        ] {
            if !key.is_empty() {
                *key = "********".to_string();
            }
        }
        copy
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Request body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.server.body_limit_mb.saturating_mul(1024 * 1024)
    }
}

fn validate_endpoint(section: &str, base_url: &str, timeout_secs: u64) -> Result<()> {
    let field = format!("{}.base_url", section);
    let url = Url::parse(base_url)
        .map_err(|e| Error::config_field_invalid(field.clone(), format!("Invalid URL '{}': {}", base_url, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::config_field_invalid(
            field,
            format!("URL must start with http:// or https://, got '{}'", base_url),
        ));
    }
    if timeout_secs == 0 {
        return Err(Error::config_field_invalid(
            format!("{}.timeout_secs", section),
            "Timeout must be at least 1 second",
        ));
    }
    Ok(())
}

/// Standard locations searched when no `--config` is given
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        // Current directory
        PathBuf::from("glowstack.toml"),
        PathBuf::from("config.toml"),
    ];
    // User config directory
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("glowstack").join("config.toml"));
    }
    // Home directory
    if let Some(dir) = dirs::home_dir() {
        paths.push(dir.join(".glowstack").join("config.toml"));
    }
    // System config (Linux)
    paths.push(PathBuf::from("/etc/glowstack/config.toml"));
    paths
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".glowstack")
                .join("config.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# Glow Stack Router Configuration

[server]
# Bind address
host = "0.0.0.0"

# Listen port (PORT is honoured too)
port = 3000

# Maximum JSON body size in MB (selfies arrive as base64)
body_limit_mb = 50

# Runtime worker threads (0 = one per CPU)
worker_threads = 0

[gemini]
# Gemini API root
base_url = "https://generativelanguage.googleapis.com/v1beta"

# API key (or set GEMINI_API_KEY)
api_key = ""

# Request timeout in seconds
timeout_secs = 60

[groq]
# OpenAI-compatible API root
base_url = "https://api.groq.com/openai/v1"

# API key (or set GROQ_API_KEY)
api_key = ""

# Request timeout in seconds
timeout_secs = 60

[transcript]
# Transcript service root
base_url = "https://transcriptapi.com/api/v2"

# API key (or set TRANSCRIPT_API_KEY)
api_key = ""

# Request timeout in seconds
timeout_secs = 30

[personas]
# Replace the bundled mentors with your own [[persona]] list
# file = "~/.glowstack/personas.toml"

# Route overrides, one table per task slug. Providers: gemini, groq, mock.
# [routing.style-advice]
# provider = "gemini"
# model = "gemini-2.5-flash"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.glowstack/logs/glowstack.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
