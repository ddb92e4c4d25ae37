//! Command handler modules for the CLI.

mod action;
mod completions;
mod containers;
mod events;
mod history;
mod host;
mod logs;
mod reconcile;
mod stats;
mod watch;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::format::Colors;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands, color: bool) -> Result<(), CliError> {
    let colors = Colors::new(color);
    match command {
        Commands::Host(subcmd) => host::cmd_host(config_path, subcmd),
        Commands::Test { name } => test::cmd_test(config_path, &name, colors),
        Commands::Reconcile { host } => reconcile::cmd_reconcile(config_path, host.as_deref()),
        Commands::Containers { host, format } => {
            containers::cmd_containers(config_path, host.as_deref(), format)
        }
        Commands::Stats { host, watch } => {
            stats::cmd_stats(config_path, host.as_deref(), watch)
        }
        Commands::Action {
            action,
            container,
            host,
        } => action::cmd_action(config_path, &action, &container, host.as_deref(), colors),
        Commands::Logs {
            container,
            host,
            lines,
        } => logs::cmd_logs(config_path, &container, host.as_deref(), lines),
        Commands::Events {
            host,
            severity,
            limit,
            format,
        } => events::cmd_events(
            config_path,
            events::EventsParams {
                host: host.as_deref(),
                severity: severity.as_deref(),
                limit,
                format,
            },
            colors,
        ),
        Commands::History {
            container,
            host,
            format,
        } => history::cmd_history(config_path, container.as_deref(), host.as_deref(), format),
        Commands::Watch => watch::cmd_watch(config_path),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
