//! Container listing command.

use std::fmt::Write as _;
use std::path::Path;

use dockwatch_core::{ContainerRecord, Host, Storage};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{escape_csv_field, format_bytes};
use crate::util::{Context, create_runtime};

/// A stored container together with the name of its host
pub struct ContainerRow {
    pub host: String,
    pub record: ContainerRecord,
}

/// Containers command handler
pub fn cmd_containers(
    config_path: Option<&Path>,
    host: Option<&str>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let rows = runtime.block_on(load_rows(&ctx, host))?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&rows)),
        OutputFormat::Json => println!("{}", format_json(&rows)?),
        OutputFormat::Csv => println!("{}", format_csv(&rows)),
    }
    Ok(())
}

async fn load_rows(ctx: &Context, host: Option<&str>) -> Result<Vec<ContainerRow>, CliError> {
    let hosts: Vec<Host> = match host {
        Some(host) => vec![ctx.host(host).await?],
        None => ctx.hosts().await?,
    };

    let mut rows = Vec::new();
    for host in hosts {
        for record in ctx.storage.list_containers(host.id).await? {
            rows.push(ContainerRow {
                host: host.name.clone(),
                record,
            });
        }
    }
    Ok(rows)
}

fn cpu_column(record: &ContainerRecord) -> String {
    record
        .metrics
        .map(|m| format!("{:.1}%", m.cpu_percent))
        .unwrap_or_else(|| "-".to_string())
}

fn memory_column(record: &ContainerRecord) -> String {
    record
        .metrics
        .map(|m| {
            format!(
                "{} / {}",
                format_bytes(m.memory_usage_bytes),
                format_bytes(m.memory_limit_bytes)
            )
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Format containers as a table string
#[must_use]
pub fn format_table(rows: &[ContainerRow]) -> String {
    if rows.is_empty() {
        return "No containers found.".to_string();
    }

    let mut output = String::new();

    let name_width = rows
        .iter()
        .map(|r| r.record.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let host_width = rows.iter().map(|r| r.host.len()).max().unwrap_or(4).max(4);
    let status_width = 10;
    let image_width = rows
        .iter()
        .map(|r| r.record.image.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let cpu_width = 6;

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<host_width$}  {:<status_width$}  {:<image_width$}  {:<cpu_width$}  MEMORY",
        "NAME", "HOST", "STATUS", "IMAGE", "CPU"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<host_width$}  {:-<status_width$}  {:-<image_width$}  {:-<cpu_width$}  {:-<6}",
        "", "", "", "", "", ""
    );

    for row in rows {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<host_width$}  {:<status_width$}  {:<image_width$}  {:<cpu_width$}  {}",
            row.record.name,
            row.host,
            row.record.status.as_str(),
            row.record.image,
            cpu_column(&row.record),
            memory_column(&row.record)
        );
    }

    output.trim_end().to_string()
}

/// Format containers as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(rows: &[ContainerRow]) -> Result<String, CliError> {
    let output: Vec<ContainerOutput> = rows.iter().map(ContainerOutput::from).collect();
    serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format containers as CSV string
#[must_use]
pub fn format_csv(rows: &[ContainerRow]) -> String {
    let mut output = String::new();
    output.push_str("name,host,status,image,ports,cpu_percent,memory_usage_bytes\n");
    for row in rows {
        let (cpu, memory) = row
            .record
            .metrics
            .map(|m| (format!("{:.2}", m.cpu_percent), m.memory_usage_bytes.to_string()))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{}",
            escape_csv_field(&row.record.name),
            escape_csv_field(&row.host),
            row.record.status.as_str(),
            escape_csv_field(&row.record.image),
            escape_csv_field(&row.record.ports),
            cpu,
            memory
        );
    }
    output.trim_end().to_string()
}

/// Container output for CLI
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContainerOutput {
    pub id: String,
    pub host: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub ports: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<dockwatch_core::ContainerMetrics>,
    pub last_updated: String,
}

impl From<&ContainerRow> for ContainerOutput {
    fn from(row: &ContainerRow) -> Self {
        Self {
            id: row.record.id.to_string(),
            host: row.host.clone(),
            name: row.record.name.clone(),
            image: row.record.image.clone(),
            status: row.record.status.as_str().to_string(),
            ports: row.record.ports.clone(),
            metrics: row.record.metrics,
            last_updated: row.record.last_updated.to_rfc3339(),
        }
    }
}
