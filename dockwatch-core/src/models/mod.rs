//! Core data model: hosts, container records, actions and activity events.

mod action;
mod container;
mod event;
mod host;

pub use action::{ActionKind, ActionRecord, ActionStatus};
pub use container::{ContainerMetrics, ContainerRecord, ContainerStatus, ListingRow};
pub use event::{ActivityEvent, Severity};
pub use host::{DEFAULT_COMPOSE_PATH, DEFAULT_SSH_PORT, Host};
