//! Activity log command.

use std::fmt::Write as _;
use std::path::Path;

use dockwatch_core::{ActivityEvent, EventFilter, Host, Severity};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{Colors, escape_csv_field};
use crate::util::{Context, create_runtime, find_host};

/// Parameters for the events command
pub struct EventsParams<'a> {
    pub host: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub limit: usize,
    pub format: OutputFormat,
}

/// Events command handler
pub fn cmd_events(
    config_path: Option<&Path>,
    params: EventsParams<'_>,
    colors: Colors,
) -> Result<(), CliError> {
    let severity = params
        .severity
        .map(str::parse::<Severity>)
        .transpose()
        .map_err(CliError::Config)?;

    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let hosts = runtime.block_on(ctx.hosts())?;

    let host_id = match params.host {
        Some(name) => Some(find_host(&hosts, name)?.id),
        None => None,
    };
    let filter = EventFilter {
        host_id,
        severity,
        limit: params.limit,
    };
    let events = runtime.block_on(ctx.events.read_recent(&filter))?;

    match params.format {
        OutputFormat::Table => println!("{}", format_table(&events, &hosts, colors)),
        OutputFormat::Json => println!("{}", format_json(&events)?),
        OutputFormat::Csv => println!("{}", format_csv(&events, &hosts)),
    }
    Ok(())
}

fn host_name(hosts: &[Host], event: &ActivityEvent) -> String {
    match event.host_id {
        Some(id) => hosts
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| id.to_string()),
        None => "-".to_string(),
    }
}

/// Format events as a table string, newest first
#[must_use]
pub fn format_table(events: &[ActivityEvent], hosts: &[Host], colors: Colors) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }

    let mut output = String::new();
    let names: Vec<String> = events.iter().map(|e| host_name(hosts, e)).collect();
    let host_width = names.iter().map(String::len).max().unwrap_or(4).max(4);
    let time_width = 19;
    let severity_width = 8;

    let _ = writeln!(
        output,
        "{:<time_width$}  {:<severity_width$}  {:<host_width$}  MESSAGE",
        "TIME", "SEVERITY", "HOST"
    );
    let _ = writeln!(
        output,
        "{:-<time_width$}  {:-<severity_width$}  {:-<host_width$}  {:-<7}",
        "", "", "", ""
    );

    for (event, host) in events.iter().zip(&names) {
        let actor = event
            .actor
            .as_deref()
            .map(|a| format!(" [{a}]"))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "{:<time_width$}  {}{:<severity_width$}{}  {:<host_width$}  {}{}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            colors.severity(event.severity),
            event.severity.as_str(),
            colors.reset,
            host,
            event.message,
            actor
        );
    }

    output.trim_end().to_string()
}

/// Format events as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(events: &[ActivityEvent]) -> Result<String, CliError> {
    serde_json::to_string_pretty(events)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format events as CSV string
#[must_use]
pub fn format_csv(events: &[ActivityEvent], hosts: &[Host]) -> String {
    let mut output = String::new();
    output.push_str("timestamp,severity,host,actor,message\n");
    for event in events {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            event.timestamp.to_rfc3339(),
            event.severity.as_str(),
            escape_csv_field(&host_name(hosts, event)),
            escape_csv_field(event.actor.as_deref().unwrap_or("")),
            escape_csv_field(&event.message)
        );
    }
    output.trim_end().to_string()
}
