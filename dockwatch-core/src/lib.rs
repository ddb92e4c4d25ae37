//! dockwatch core library
//!
//! Keeps a local inventory of the containers running on a fleet of SSH
//! hosts in step with what the hosts actually report.
//!
//! # Crate Structure
//!
//! - [`models`] - Hosts, container records, actions and activity events
//! - [`remote`] - SSH sessions (`Connector` / `Channel` / `RemoteSession`)
//! - [`monitoring`] - Output parsing, fetches, reconciliation and stats passes
//! - [`action`] - Container lifecycle actions and their audit trail
//! - [`storage`] - Persistence boundary with in-memory and JSON file adapters
//! - [`events`] - Append-only activity log sinks
//! - [`config`] - `config.toml` and the configuration directory
//! - [`tracing`] - Logging setup and span vocabulary
//! - [`testing`] - Scripted transport for tests

#![warn(missing_docs)]

pub mod action;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod monitoring;
pub mod remote;
pub mod storage;
pub mod testing;
pub mod tracing;

pub use action::{ActionExecutor, ActionOutcome, ActionService};
pub use config::{AppSettings, ConfigManager};
pub use error::{
    ActionError, ConfigError, ConnectError, DockwatchError, DockwatchResult, FetchError,
    StorageError, StorageResult,
};
pub use events::{EventFilter, EventSink, JsonlEventSink, MemoryEventSink};
pub use models::{
    ActionKind, ActionRecord, ActionStatus, ActivityEvent, ContainerMetrics, ContainerRecord,
    ContainerStatus, Host, ListingRow, Severity,
};
pub use monitoring::{
    DockerClient, HostReport, LiveStats, OutputParser, PassSummary, ProbeResult,
    ReconciliationEngine, RuntimeSettings, ScheduleSettings, StatsReport, StatsUpdater,
};
pub use remote::{CommandOutput, Connector, OpenSshConnector, RemoteSession, SessionState};
pub use storage::{FileStorage, HostFilter, InMemoryStorage, Storage};
