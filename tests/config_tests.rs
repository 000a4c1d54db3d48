//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides
//! through the public API and the `config` subcommands.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

use glowstack::config::RouterConfig;
use glowstack::error::ErrorCode;
use glowstack::provider::ProviderKind;
use glowstack::types::TaskKind;

/// Test fixture for configuration testing
struct ConfigFixture {
    _temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new(content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("glowstack.toml");
        fs::write(&config_path, content).unwrap();
        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }

    fn load(&self) -> glowstack::Result<RouterConfig> {
        RouterConfig::load(Some(self.path()))
    }
}

fn validate_cmd(fixture: &ConfigFixture) -> assert_cmd::assert::Assert {
    Command::cargo_bin("glowstack")
        .unwrap()
        .env_remove("GLOWSTACK_PORT")
        .env_remove("PORT")
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
}

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_uses_defaults() {
    let fixture = ConfigFixture::new("");
    let config = fixture.load().unwrap();
    assert_eq!(config.server.body_limit_mb, 50);
    assert_eq!(config.transcript.timeout_secs, 30);
    validate_cmd(&fixture).success();
}

#[test]
fn test_routing_override() {
    let fixture = ConfigFixture::new(
        r#"
[routing.fitness-advice]
provider = "gemini"
model = "gemini-2.5-flash"

[routing.lecture-summary]
provider = "mock"
model = "echo"
"#,
    );

    let config = fixture.load().unwrap();
    let routes = glowstack::provider::RoutingTable::build(&config.routing).unwrap();
    assert_eq!(routes.route(TaskKind::FitnessAdvice).provider, ProviderKind::Gemini);
    assert_eq!(routes.route(TaskKind::LectureSummary).model, "echo");
    assert_eq!(routes.route(TaskKind::StyleAdvice).provider, ProviderKind::Groq);
    validate_cmd(&fixture).success();
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_task_in_routing() {
    let fixture = ConfigFixture::new("[routing.teleport]\nprovider = \"groq\"\n");
    let err = fixture.load().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigValidation);
    validate_cmd(&fixture).failure().code(10);
}

#[test]
fn test_unknown_provider_in_routing() {
    let fixture = ConfigFixture::new("[routing.style-advice]\nprovider = \"skynet\"\n");
    assert_eq!(fixture.load().unwrap_err().code(), ErrorCode::ConfigValidation);
}

#[test]
fn test_persona_chat_cannot_route_to_single_turn_backend() {
    let fixture = ConfigFixture::new("[routing.persona-chat]\nprovider = \"groq\"\n");
    assert_eq!(fixture.load().unwrap_err().code(), ErrorCode::ConfigValidation);
}

#[test]
fn test_invalid_base_url() {
    let fixture = ConfigFixture::new("[gemini]\nbase_url = \"ftp://example.com\"\n");
    assert_eq!(fixture.load().unwrap_err().code(), ErrorCode::ConfigValidation);
    validate_cmd(&fixture).failure();
}

#[test]
fn test_zero_timeout() {
    let fixture = ConfigFixture::new("[groq]\ntimeout_secs = 0\n");
    assert!(fixture.load().is_err());
}

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFixture::new("[logging]\nlevel = \"invalid_level\"\n");
    validate_cmd(&fixture).failure();
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFixture::new("[server\nport = 3000\n");
    assert_eq!(fixture.load().unwrap_err().code(), ErrorCode::ConfigParseError);
    validate_cmd(&fixture)
        .failure()
        .stderr(predicates::str::contains("E101"));
}

// ─────────────────────────────────────────────────────────────────
// Environment Variable Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_env_override_port() {
    let fixture = ConfigFixture::new("[server]\nport = 3000\n");

    Command::cargo_bin("glowstack")
        .unwrap()
        .env("GLOWSTACK_PORT", "8088")
        .args(["config", "show", "--config", fixture.path()])
        .assert()
        .success()
        .stdout(predicates::str::contains("port = 8088"));
}

#[test]
fn test_bare_api_key_env_is_accepted() {
    let fixture = ConfigFixture::new("");

    let output = Command::cargo_bin("glowstack")
        .unwrap()
        .env("GROQ_API_KEY", "gsk-from-env")
        .args(["config", "show", "--config", fixture.path()])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("gsk-from-env"));
    assert!(stdout.contains("********"));
}

// ─────────────────────────────────────────────────────────────────
// Path Expansion Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_tilde_expansion() {
    let fixture = ConfigFixture::new(
        r#"
[personas]
file = "~/mentors.toml"

[logging]
file = "~/logs/glowstack.log"
"#,
    );

    let config = fixture.load().unwrap();
    assert!(!config.personas.file.unwrap().starts_with('~'));
    assert!(!config.logging.file.unwrap().starts_with('~'));
}
