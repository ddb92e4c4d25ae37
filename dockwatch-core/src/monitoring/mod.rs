//! Container monitoring: output parsing, fetches and the periodic passes
//!
//! The passes have no timers of their own. A periodic driver calls
//! [`ReconciliationEngine::run_reconciliation_pass`] and
//! [`StatsUpdater::run_stats_pass`] at whatever cadence it likes.

pub mod client;
pub mod parser;
pub mod reconcile;
pub mod settings;
pub mod stats;
pub mod units;

pub use client::DockerClient;
pub use parser::{
    OutputParser, listing_command, logs_command, normalize_status, stats_command, version_command,
};
pub use reconcile::{HostReport, PassSummary, ProbeResult, ReconciliationEngine};
pub use settings::{DEFAULT_LOG_TAIL_LINES, RuntimeSettings, ScheduleSettings};
pub use stats::{LiveStats, StatsReport, StatsUpdater};
pub use units::{SIZE_SUFFIXES, parse_percentage, parse_size, parse_size_pair};
