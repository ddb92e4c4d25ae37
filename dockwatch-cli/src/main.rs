//! dockwatch CLI - Command-line interface for dockwatch container monitoring
//!
//! Provides commands for managing hosts, testing connectivity, reconciling
//! the container inventory, refreshing and streaming resource usage,
//! running container actions, reading logs and the activity log, and the
//! periodic `watch` loop.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use std::path::Path;

use clap::Parser;
use cli::Cli;
use dockwatch_core::tracing::{TracingLevel, TracingOutput, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    init_logging(config_path, cli.verbose, cli.quiet);

    let result = commands::dispatch(config_path, cli.command, !cli.no_color);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Sets up logging from `[logging]`.
///
/// The terminal only gets warnings unless `-v` asks for more; a log file
/// gets the configured level. Settings errors are reported by the command
/// itself, so they are ignored here.
fn init_logging(config_path: Option<&Path>, verbose: u8, quiet: bool) {
    let settings = util::create_config_manager(config_path)
        .and_then(|config| {
            config
                .load_settings()
                .map_err(|e| error::CliError::Config(e.to_string()))
        })
        .unwrap_or_default();

    let mut config = settings.logging.tracing_config();
    if config.output == TracingOutput::Stderr {
        config.level = TracingLevel::Warn;
    }
    for _ in 0..verbose {
        config.level = config.level.more_verbose();
    }
    if quiet {
        config.level = TracingLevel::Error;
    }
    // Command-line verbosity beats a configured filter
    if verbose > 0 || quiet {
        config.filter = None;
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}
