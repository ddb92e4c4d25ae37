//! CLI error types and exit codes.

use dockwatch_core::error::{DockwatchError, StorageError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - host unreachable, remote command failed, or host
    /// not found
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host not found
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// Container not found
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    /// Connection test failed
    #[error("Connection test failed: {0}")]
    TestFailed(String),

    /// Remote fetch or session failure
    #[error("Remote error: {0}")]
    Remote(String),

    /// Action rejected or failed
    #[error("Action error: {0}")]
    Action(String),

    /// Inventory or activity log failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background monitoring loop panicked or was cancelled
    #[error("Monitoring task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DockwatchError> for CliError {
    fn from(err: DockwatchError) -> Self {
        match err {
            DockwatchError::Storage(StorageError::HostNotFound(id)) => {
                Self::HostNotFound(id.to_string())
            }
            DockwatchError::Storage(StorageError::ContainerNotFound(id)) => {
                Self::ContainerNotFound(id.to_string())
            }
            DockwatchError::Storage(e) => Self::Storage(e.to_string()),
            DockwatchError::Fetch(e) => Self::Remote(e.to_string()),
            DockwatchError::Connect(e) => Self::Remote(e.to_string()),
            DockwatchError::Action(e) => Self::Action(e.to_string()),
            DockwatchError::Config(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        DockwatchError::from(err).into()
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, storage, IO)
    /// - 2: Connection failure (test failed, remote error, host not found)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TestFailed(_) | Self::HostNotFound(_) | Self::Remote(_) => {
                exit_codes::CONNECTION_FAILURE
            }
            Self::Config(_)
            | Self::ContainerNotFound(_)
            | Self::Action(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Task(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
