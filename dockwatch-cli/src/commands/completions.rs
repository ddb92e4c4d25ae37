//! Shell completions command.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::error::CliError;

/// Completions command handler
#[allow(clippy::unnecessary_wraps)]
pub fn cmd_completions(shell: Shell) -> Result<(), CliError> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "dockwatch", &mut std::io::stdout());
    Ok(())
}
