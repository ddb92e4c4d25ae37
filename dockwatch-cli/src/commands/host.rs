//! Host management commands.

use std::fmt::Write as _;
use std::path::Path;

use dockwatch_core::{Host, Storage};
use secrecy::SecretString;

use crate::cli::{HostCommands, OutputFormat};
use crate::error::CliError;
use crate::format::escape_csv_field;
use crate::util::{Context, create_runtime, find_host};

/// Parameters for the host add command
pub struct AddParams<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub port: u16,
    pub user: &'a str,
    pub key: Option<&'a str>,
    pub compose_path: Option<&'a str>,
    pub ask_password: bool,
}

/// Host command handler
pub fn cmd_host(config_path: Option<&Path>, subcmd: HostCommands) -> Result<(), CliError> {
    match subcmd {
        HostCommands::Add {
            name,
            address,
            port,
            user,
            key,
            compose_path,
            ask_password,
        } => cmd_host_add(
            config_path,
            &AddParams {
                name: &name,
                address: &address,
                port,
                user: &user,
                key: key.as_deref(),
                compose_path: compose_path.as_deref(),
                ask_password,
            },
        ),
        HostCommands::List { format } => cmd_host_list(config_path, format),
        HostCommands::Remove { name } => cmd_host_remove(config_path, &name),
    }
}

fn cmd_host_add(config_path: Option<&Path>, params: &AddParams<'_>) -> Result<(), CliError> {
    if params.name.trim().is_empty() {
        return Err(CliError::Config("Host name cannot be empty".to_string()));
    }
    if params.address.trim().is_empty() {
        return Err(CliError::Config("Host address cannot be empty".to_string()));
    }

    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;

    let existing = runtime.block_on(ctx.hosts())?;
    if existing
        .iter()
        .any(|h| h.name.eq_ignore_ascii_case(params.name))
    {
        return Err(CliError::Config(format!(
            "Host '{}' already exists",
            params.name
        )));
    }

    let mut host = Host::new(params.name, params.address, params.user).with_port(params.port);
    if let Some(key) = params.key {
        host = host.with_identity_file(key);
    }
    if let Some(path) = params.compose_path {
        host = host.with_compose_path(path);
    }
    if params.ask_password {
        eprint!("Enter SSH password for '{}': ", host.destination());
        let password = rpassword::read_password()
            .map_err(|e| CliError::Config(format!("Failed to read password: {e}")))?;
        host = host.with_password(SecretString::from(password));
    }

    runtime.block_on(ctx.storage.save_host(&host))?;

    println!("Added host '{}' (ID: {})", host.name, host.id);
    Ok(())
}

fn cmd_host_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let hosts = runtime.block_on(ctx.hosts())?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&hosts)),
        OutputFormat::Json => println!("{}", format_json(&hosts)?),
        OutputFormat::Csv => println!("{}", format_csv(&hosts)),
    }
    Ok(())
}

fn cmd_host_remove(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;

    let hosts = runtime.block_on(ctx.hosts())?;
    let host = find_host(&hosts, name)?;

    runtime.block_on(ctx.storage.remove_host(host.id))?;

    println!("Removed host '{}' (ID: {})", host.name, host.id);
    Ok(())
}

fn connectivity(host: &Host) -> &'static str {
    match (host.last_check, host.is_connected) {
        (None, _) => "never checked",
        (Some(_), true) => "connected",
        (Some(_), false) => "disconnected",
    }
}

/// Format hosts as a table string
#[must_use]
pub fn format_table(hosts: &[Host]) -> String {
    if hosts.is_empty() {
        return "No hosts found.".to_string();
    }

    let mut output = String::new();

    let name_width = hosts.iter().map(|h| h.name.len()).max().unwrap_or(4).max(4);
    let dest_width = hosts
        .iter()
        .map(|h| h.destination().len())
        .max()
        .unwrap_or(11)
        .max(11);
    let port_width = 5;
    let state_width = 13;

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<dest_width$}  {:<port_width$}  {:<state_width$}  LAST CHECK",
        "NAME", "DESTINATION", "PORT", "STATE"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<dest_width$}  {:-<port_width$}  {:-<state_width$}  {:-<10}",
        "", "", "", "", ""
    );

    for host in hosts {
        let last_check = host
            .last_check
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<dest_width$}  {:<port_width$}  {:<state_width$}  {}",
            host.name,
            host.destination(),
            host.port,
            connectivity(host),
            last_check
        );
    }

    output.trim_end().to_string()
}

/// Format hosts as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(hosts: &[Host]) -> Result<String, CliError> {
    let output: Vec<HostOutput> = hosts.iter().map(HostOutput::from).collect();
    serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format hosts as CSV string
#[must_use]
pub fn format_csv(hosts: &[Host]) -> String {
    let mut output = String::new();
    output.push_str("name,address,port,username,connected\n");
    for host in hosts {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            escape_csv_field(&host.name),
            escape_csv_field(&host.address),
            host.port,
            escape_csv_field(&host.username),
            host.is_connected
        );
    }
    output.trim_end().to_string()
}

/// Host output for CLI; never carries the password
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HostOutput {
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub username: String,
    pub compose_path: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
}

impl From<&Host> for HostOutput {
    fn from(host: &Host) -> Self {
        Self {
            id: host.id.to_string(),
            name: host.name.clone(),
            address: host.address.clone(),
            port: host.port,
            username: host.username.clone(),
            compose_path: host.compose_path.clone(),
            connected: host.is_connected,
            last_check: host.last_check.map(|t| t.to_rfc3339()),
            identity_file: host.identity_file.clone(),
        }
    }
}
