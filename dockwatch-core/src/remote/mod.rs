//! Remote command execution over SSH
//!
//! A [`Connector`] opens one [`Channel`] per logical operation; a
//! [`RemoteSession`] wraps it with the connect/execute/close lifecycle.
//! Sessions are never pooled: every caller-level operation connects,
//! does its work and closes.

mod session;
pub mod ssh_exec;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::models::Host;

pub use session::{CommandOutput, RemoteSession, SessionState};
pub use ssh_exec::OpenSshConnector;

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Raw result of one remote command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutput {
    /// Exit status, `-1` if the remote side reported none
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

/// Opens connections to hosts
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a connection, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] on any spawn, network or auth failure.
    async fn connect(&self, host: &Host, timeout: Duration)
    -> Result<Box<dyn Channel>, ConnectError>;
}

/// One established connection
#[async_trait]
pub trait Channel: Send {
    /// Runs a single command line and waits for it to finish
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the command could not be run at all; a
    /// non-zero remote exit is not an error.
    async fn exec(&mut self, command: &str) -> std::io::Result<ExecOutput>;

    /// Releases the connection
    async fn close(&mut self);
}
