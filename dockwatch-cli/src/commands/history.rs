//! Action history command.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use dockwatch_core::{ActionRecord, Storage};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::escape_csv_field;
use crate::util::{Context, create_runtime};

/// History command handler
pub fn cmd_history(
    config_path: Option<&Path>,
    container: Option<&str>,
    host: Option<&str>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let records = runtime.block_on(load_actions(&ctx, container, host))?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&records)),
        OutputFormat::Json => println!("{}", format_json(&records)?),
        OutputFormat::Csv => println!("{}", format_csv(&records)),
    }
    Ok(())
}

async fn load_actions(
    ctx: &Context,
    container: Option<&str>,
    host: Option<&str>,
) -> Result<Vec<ActionRecord>, CliError> {
    if let Some(container) = container {
        let (_, record) = ctx.container(container, host).await?;
        return Ok(ctx.storage.list_actions(Some(record.id)).await?);
    }

    let records = ctx.storage.list_actions(None).await?;
    let Some(host) = host else {
        return Ok(records);
    };

    // Actions on containers that were removed since cannot be attributed
    let host = ctx.host(host).await?;
    let ids: HashSet<_> = ctx
        .storage
        .list_containers(host.id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    Ok(records
        .into_iter()
        .filter(|r| ids.contains(&r.container_id))
        .collect())
}

/// Format action records as a table string
#[must_use]
pub fn format_table(records: &[ActionRecord]) -> String {
    if records.is_empty() {
        return "No actions found.".to_string();
    }

    let mut output = String::new();
    let time_width = 19;
    let action_width = 7;
    let container_width = records
        .iter()
        .map(|r| r.container_name.len())
        .max()
        .unwrap_or(9)
        .max(9);
    let status_width = 9;
    let actor_width = records
        .iter()
        .map(|r| r.actor.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let _ = writeln!(
        output,
        "{:<time_width$}  {:<action_width$}  {:<container_width$}  {:<status_width$}  {:<actor_width$}  RESULT",
        "ISSUED", "ACTION", "CONTAINER", "STATUS", "ACTOR"
    );
    let _ = writeln!(
        output,
        "{:-<time_width$}  {:-<action_width$}  {:-<container_width$}  {:-<status_width$}  {:-<actor_width$}  {:-<6}",
        "", "", "", "", "", ""
    );

    for record in records {
        let result = record.result_message.lines().next().unwrap_or_default();
        let _ = writeln!(
            output,
            "{:<time_width$}  {:<action_width$}  {:<container_width$}  {:<status_width$}  {:<actor_width$}  {}",
            record.issued_at.format("%Y-%m-%d %H:%M:%S"),
            record.action.as_str(),
            record.container_name,
            record.status.as_str(),
            record.actor,
            result
        );
    }

    output.trim_end().to_string()
}

/// Format action records as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(records: &[ActionRecord]) -> Result<String, CliError> {
    serde_json::to_string_pretty(records)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format action records as CSV string
#[must_use]
pub fn format_csv(records: &[ActionRecord]) -> String {
    let mut output = String::new();
    output.push_str("issued_at,completed_at,action,container,status,actor,result\n");
    for record in records {
        let completed = record
            .completed_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{}",
            record.issued_at.to_rfc3339(),
            completed,
            record.action.as_str(),
            escape_csv_field(&record.container_name),
            record.status.as_str(),
            escape_csv_field(&record.actor),
            escape_csv_field(&record.result_message)
        );
    }
    output.trim_end().to_string()
}
