//! Container action command.

use std::path::Path;

use dockwatch_core::{ActionService, ActionStatus};

use crate::error::CliError;
use crate::format::Colors;
use crate::util::{Context, actor, create_runtime};

/// Action command handler
pub fn cmd_action(
    config_path: Option<&Path>,
    action: &str,
    container: &str,
    host: Option<&str>,
    colors: Colors,
) -> Result<(), CliError> {
    let kind = ActionService::validate(action).map_err(|e| CliError::Action(e.to_string()))?;

    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let (host, record) = runtime.block_on(ctx.container(container, host))?;

    eprintln!("Running {kind} on {} ({})...", record.name, host.name);
    let actor = actor();
    let result = runtime.block_on(ctx.actions().perform(record.id, kind.as_str(), &actor))?;

    if result.status == ActionStatus::Success {
        println!(
            "{}✓{} {} {}: {}",
            colors.green, colors.reset, kind, record.name, result.result_message
        );
        Ok(())
    } else {
        println!(
            "{}✗{} {} {}: {}",
            colors.red, colors.reset, kind, record.name, result.result_message
        );
        Err(CliError::Action(format!("{kind} {} failed", record.name)))
    }
}
