mod cli;
mod commands;
mod config;

use clap::Parser;
use std::path::Path;

use cli::{Cli, Command};
use config::ControllerConfig;

fn main() {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    let logger = initialize_logger(&config);
    logger.info("Arm controller starting...");

    let result = match cli.command {
        Command::Stream(args) => commands::stream::run(args, &config, &logger),
        Command::Calibrate(args) => commands::calibrate::run(args, &config, &logger),
        Command::Devices => commands::devices::run(&logger),
        Command::Snapshot(args) => commands::snapshot::run(args, &config, &logger),
        Command::Process(args) => commands::process::run(args, &logger),
    };

    if let Err(e) = result {
        logger.error(&format!("Command failed: {}", e));
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &ControllerConfig) -> logging::Logger {
    let level = config.logging.level();

    match logging::Logger::with_target(config.logging.target(), level) {
        Ok(logger) => logger.for_component("main"),
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            std::process::exit(1);
        }
    }
}

/// Loads configuration from `--config`, the usual locations, or defaults
fn load_config(explicit: Option<&Path>) -> ControllerConfig {
    let loaded = match explicit {
        Some(path) => ControllerConfig::load_from_file(path),
        None => ControllerConfig::locate(),
    };

    match loaded {
        Ok(config) => config,
        Err(config_loader::ConfigError::FileNotFound(_)) if explicit.is_none() => {
            ControllerConfig::default()
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Using default values...");
            ControllerConfig::default()
        }
    }
}
