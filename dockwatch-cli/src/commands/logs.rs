//! Container logs command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{Context, create_runtime};

/// Logs command handler
pub fn cmd_logs(
    config_path: Option<&Path>,
    container: &str,
    host: Option<&str>,
    lines: Option<u32>,
) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let (host, record) = runtime.block_on(ctx.container(container, host))?;

    let logs = runtime
        .block_on(ctx.client.container_logs(&host, &record.name, lines))
        .map_err(|e| CliError::Remote(e.to_string()))?;

    print!("{logs}");
    if !logs.is_empty() && !logs.ends_with('\n') {
        println!();
    }
    Ok(())
}
