//! Container lifecycle actions
//!
//! [`ActionExecutor`] turns an action into a shell command and runs it;
//! [`ActionService`] adds the audit record, the inventory write and the
//! activity event around it.

pub mod commands;
mod executor;
mod service;

pub use commands::{action_command, compose_dir, is_valid_container_name, shell_quote};
pub use executor::{ActionExecutor, ActionOutcome};
pub use service::{ActionService, status_after};
