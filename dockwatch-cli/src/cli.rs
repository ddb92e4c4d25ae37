//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// dockwatch command-line interface for monitoring containers on SSH hosts
#[derive(Parser)]
#[command(name = "dockwatch")]
#[command(author, version, about = "dockwatch command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage monitored hosts
    #[command(subcommand, about = "Manage monitored hosts")]
    Host(HostCommands),

    /// Test SSH connectivity and runtime availability
    #[command(about = "Test connectivity to a host")]
    Test {
        /// Host name or ID (use "all" to test every host)
        name: String,
    },

    /// Reconcile the stored inventory with the hosts
    #[command(about = "Run one reconciliation pass, or refresh a single host")]
    Reconcile {
        /// Refresh only this host (name or ID)
        #[arg(short = 'H', long)]
        host: Option<String>,
    },

    /// List stored containers
    #[command(about = "List containers in the inventory")]
    Containers {
        /// Only containers of this host (name or ID)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Output format for the container list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Refresh or stream resource usage
    #[command(about = "Refresh container resource usage")]
    Stats {
        /// Only this host (name or ID); required with --watch
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Stream live samples until interrupted, without storing them
        #[arg(short, long, requires = "host")]
        watch: bool,
    },

    /// Run a lifecycle action on a container
    #[command(about = "Start, stop, restart, pause, unpause, remove or rebuild a container")]
    Action {
        /// Action name
        action: String,

        /// Container name
        container: String,

        /// Host of the container, when the name is not unique
        #[arg(short = 'H', long)]
        host: Option<String>,
    },

    /// Show container logs
    #[command(about = "Show the tail of a container's logs")]
    Logs {
        /// Container name
        container: String,

        /// Host of the container, when the name is not unique
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Number of lines (defaults to `log_tail_lines`)
        #[arg(short = 'n', long)]
        lines: Option<u32>,
    },

    /// Show the activity log
    #[command(about = "Show recent activity events")]
    Events {
        /// Only events about this host (name or ID)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Only events of this severity (info, success, warning, error)
        #[arg(short, long)]
        severity: Option<String>,

        /// Maximum number of events
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Output format for the event list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show the action audit trail
    #[command(about = "Show recorded container actions")]
    History {
        /// Only actions on this container
        #[arg(long)]
        container: Option<String>,

        /// Host of the container, when the name is not unique
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Output format for the action list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Run reconciliation and stats passes periodically
    #[command(about = "Run the periodic monitoring loop until interrupted")]
    Watch,

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Host subcommands
#[derive(Subcommand)]
pub enum HostCommands {
    /// Add a host
    #[command(about = "Add a host to the inventory")]
    Add {
        /// Name for the new host
        #[arg(short, long)]
        name: String,

        /// Host address (hostname or IP)
        #[arg(short = 'H', long)]
        address: String,

        /// SSH port
        #[arg(short, long, default_value = "22")]
        port: u16,

        /// SSH username
        #[arg(short, long)]
        user: String,

        /// Path to SSH private key file
        #[arg(short, long)]
        key: Option<String>,

        /// Path of the compose file on the host
        #[arg(long, value_name = "PATH")]
        compose_path: Option<String>,

        /// Prompt for an SSH password (used through sshpass)
        #[arg(long)]
        ask_password: bool,
    },

    /// List hosts
    #[command(about = "List hosts in the inventory")]
    List {
        /// Output format for the host list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Remove a host and its containers
    #[command(about = "Remove a host together with its containers")]
    Remove {
        /// Host name or ID
        name: String,
    },
}

/// Output format for list commands
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
    /// Output as CSV
    Csv,
}
