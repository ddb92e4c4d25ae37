//! Error types for dockwatch
//!
//! Two result conventions coexist: fetch operations (listing,
//! stats, logs) return `Result<_, FetchError>`, while container actions
//! return an [`crate::action::ActionOutcome`] value and never fail.

use thiserror::Error;
use uuid::Uuid;

use crate::models::ActionStatus;

/// Shell or network failure while opening a remote session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The local SSH client could not be started
    #[error("Failed to spawn SSH client: {0}")]
    Spawn(String),

    /// The connection did not complete in time
    #[error("SSH connection to {destination} timed out after {secs}s")]
    Timeout {
        /// `user@host` that was dialed
        destination: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// Authentication or transport handshake failed
    #[error("SSH connection to {destination} failed: {reason}")]
    Handshake {
        /// `user@host` that was dialed
        destination: String,
        /// Client diagnostics
        reason: String,
    },
}

/// Failure of a listing, stats or log fetch
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No session could be established
    #[error(transparent)]
    Connection(#[from] ConnectError),

    /// The remote command exited non-zero
    #[error("Failed to {operation}: {message}")]
    Command {
        /// What was being fetched, e.g. `get containers`
        operation: &'static str,
        /// Remote stderr, or a generic message when empty
        message: String,
        /// Remote exit status, `-1` when unknown
        exit_code: i32,
    },

    /// The container name is not safe to put on a command line
    #[error("Invalid container name: {0:?}")]
    InvalidName(String),
}

/// Failure of the storage collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    /// No host with this ID
    #[error("Host not found: {0}")]
    HostNotFound(Uuid),

    /// No container record with this ID
    #[error("Container not found: {0}")]
    ContainerNotFound(Uuid),

    /// Backing file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Action request errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Not one of the seven known actions
    #[error("Unknown action: {0}")]
    Unknown(String),

    /// The action record lifecycle would move backwards
    #[error("Invalid action status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: ActionStatus,
        /// Requested status
        to: ActionStatus,
    },
}

/// Configuration loading and saving errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// File could not be read or written
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// TOML could not be produced
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Umbrella error for operations that cross several collaborators
#[derive(Debug, Error)]
pub enum DockwatchError {
    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Remote fetch failure
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Session could not be opened
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Action lifecycle failure
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for cross-collaborator operations
pub type DockwatchResult<T> = Result<T, DockwatchError>;
