//! Glow Stack - persona and task router
//!
//! Entry point for the `glowstack` binary. `serve` starts the HTTP server;
//! the other commands inspect configuration, personas and routes.

mod cli;

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};

use glowstack::config::{self, RouterConfig};
use glowstack::error::{Error, Result};
use glowstack::logging;
use glowstack::persona::PersonaRegistry;
use glowstack::provider::RoutingTable;
use glowstack::version;
use glowstack::{server, Dispatcher};

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonasSubcommand};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            print!("{}", version::build_info());
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(cli.verbose, cli.quiet)?;
            handle_config_command(subcommand)
        }
        Commands::Personas { subcommand } => {
            logging::init_simple(cli.verbose, cli.quiet)?;
            handle_personas_command(subcommand)
        }
        Commands::Routes { config } => {
            logging::init_simple(cli.verbose, cli.quiet)?;
            let cfg = RouterConfig::load(config.as_deref())?;
            print_routes(&cfg)
        }
        Commands::Serve { config, host, port } => {
            let mut cfg = RouterConfig::load(config.as_deref())?;
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            cfg.validate()?;

            // Held until exit so buffered file logs are flushed
            let _log_guards = logging::init_logging(&cfg.logging, cli.verbose, cli.quiet)?;
            run_server(cfg)
        }
    }
}

/// Build the runtime and serve until shutdown
fn run_server(config: RouterConfig) -> Result<()> {
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting Glow Stack router"
    );

    let dispatcher = Dispatcher::from_config(&config)?;
    info!(
        personas = dispatcher.personas().len(),
        providers = ?dispatcher.routes().providers_in_use(),
        "Routing tables ready"
    );

    for section in config.missing_credentials(dispatcher.routes()) {
        warn!(section, "No API key configured; calls to this backend will fail");
    }

    let worker_threads = match config.server.worker_threads {
        0 => num_cpus::get(),
        n => n,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    info!(worker_threads, "Runtime started");
    runtime.block_on(server::serve(&config, dispatcher))
}

fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = RouterConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg.redacted())?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            let cfg = RouterConfig::load(config.as_deref())?;
            let routes = RoutingTable::build(&cfg.routing)?;
            println!("Configuration is valid.");
            for section in cfg.missing_credentials(&routes) {
                println!("  warning: [{}] has no api_key", section);
            }
        }
    }

    Ok(())
}

fn handle_personas_command(subcommand: PersonasSubcommand) -> Result<()> {
    match subcommand {
        PersonasSubcommand::List { config } => {
            let registry = load_personas(config.as_deref())?;
            println!("{:<12} {:<20} ROLE", "ID", "NAME");
            for persona in registry.list() {
                println!("{:<12} {:<20} {}", persona.id, persona.name, persona.role);
            }
        }
        PersonasSubcommand::Show { id, config } => {
            let registry = load_personas(config.as_deref())?;
            let persona = registry.get(&id)?;
            println!("{}", persona);
            println!();
            println!("{}", persona.system_instruction());
        }
    }

    Ok(())
}

fn load_personas(config_path: Option<&str>) -> Result<PersonaRegistry> {
    let cfg = RouterConfig::load(config_path)?;
    PersonaRegistry::load(cfg.personas.file.as_deref().map(Path::new))
}

fn print_routes(config: &RouterConfig) -> Result<()> {
    let routes = RoutingTable::build(&config.routing)?;
    println!("{:<26} {:<24} {:<8} MODEL", "TASK", "PATH", "PROVIDER");
    for (kind, route) in routes.iter() {
        println!(
            "{:<26} {:<24} {:<8} {}",
            kind.slug(),
            kind.path(),
            route.provider.name(),
            route.model
        );
    }
    Ok(())
}
