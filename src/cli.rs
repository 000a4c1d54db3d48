//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the Glow Stack router.

use clap::{Parser, Subcommand};

/// Glow Stack - persona and task router for generative backends
///
/// Serves the Glow Stack HTTP endpoints and routes each task to the
/// configured generation backend.
#[derive(Parser, Debug)]
#[command(name = "glowstack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "GLOWSTACK_CONFIG")]
        config: Option<String>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect the mentor persona registry
    Personas {
        #[command(subcommand)]
        subcommand: PersonasSubcommand,
    },

    /// Print the effective task routing table
    Routes {
        /// Path to configuration file
        #[arg(short, long, env = "GLOWSTACK_CONFIG")]
        config: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonasSubcommand {
    /// List every registered persona
    List {
        /// Path to configuration file
        #[arg(short, long, env = "GLOWSTACK_CONFIG")]
        config: Option<String>,
    },

    /// Show one persona and its system instruction
    Show {
        /// Persona id (e.g. sundar, riya)
        id: String,

        /// Path to configuration file
        #[arg(short, long, env = "GLOWSTACK_CONFIG")]
        config: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration (API keys masked)
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
