//! Lifecycle of a single SSH session
//!
//! `Disconnected → Connecting → Connected → Disconnected`. Execution
//! reconnects implicitly when no connection is active, and never lets a
//! transport failure escape: it is folded into a failed [`CommandOutput`].

use std::sync::Arc;
use std::time::Duration;

use super::{Channel, Connector};
use crate::error::ConnectError;
use crate::models::Host;

/// Connection state of a [`RemoteSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection
    Disconnected,
    /// Connection attempt in progress
    Connecting,
    /// Ready to execute commands
    Connected,
}

/// Outcome of [`RemoteSession::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `true` when the command exited with status 0
    pub success: bool,
    /// Trimmed stdout
    pub stdout: String,
    /// Trimmed stderr, or the transport error when the command never ran
    pub stderr: String,
    /// Remote exit status, `-1` when the command never ran
    pub exit_code: i32,
}

impl CommandOutput {
    fn not_run(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: message.into(),
            exit_code: -1,
        }
    }
}

/// A connection to one host, used for one logical operation
pub struct RemoteSession {
    host: Host,
    connector: Arc<dyn Connector>,
    timeout: Duration,
    channel: Option<Box<dyn Channel>>,
    state: SessionState,
}

impl RemoteSession {
    /// Creates a disconnected session; the first command connects it
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, host: Host, timeout: Duration) -> Self {
        Self {
            host,
            connector,
            timeout,
            channel: None,
            state: SessionState::Disconnected,
        }
    }

    /// Creates a session and connects it right away
    ///
    /// # Errors
    ///
    /// Returns the [`ConnectError`] of the failed connection attempt.
    pub async fn open(
        connector: Arc<dyn Connector>,
        host: Host,
        timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let mut session = Self::new(connector, host, timeout);
        session.connect().await?;
        Ok(session)
    }

    /// Current connection state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The host this session talks to
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Connects if not already connected
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] if the connector fails or times out.
    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        if self.channel.is_some() {
            return Ok(());
        }

        self.state = SessionState::Connecting;
        match self.connector.connect(&self.host, self.timeout).await {
            Ok(channel) => {
                self.channel = Some(channel);
                self.state = SessionState::Connected;
                tracing::debug!(host = %self.host.address, "SSH session established");
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Disconnected;
                tracing::warn!(host = %self.host.address, error = %err, "SSH connection failed");
                Err(err)
            }
        }
    }

    /// Runs one command line, connecting first if needed.
    ///
    /// Never fails: connection and transport errors come back as an
    /// unsuccessful [`CommandOutput`] with `exit_code == -1`.
    pub async fn execute(&mut self, command: &str) -> CommandOutput {
        if let Err(err) = self.connect().await {
            return CommandOutput::not_run(format!("SSH connection failed: {err}"));
        }
        let Some(channel) = self.channel.as_mut() else {
            return CommandOutput::not_run("SSH connection failed");
        };

        tracing::debug!(host = %self.host.address, command, "Executing remote command");
        let result = channel.exec(command).await;
        match result {
            Ok(output) => {
                if output.exit_code != 0 {
                    tracing::debug!(
                        host = %self.host.address,
                        exit_code = output.exit_code,
                        stderr = %output.stderr.trim(),
                        "Remote command exited non-zero"
                    );
                }
                CommandOutput {
                    success: output.exit_code == 0,
                    stdout: output.stdout.trim().to_string(),
                    stderr: output.stderr.trim().to_string(),
                    exit_code: output.exit_code,
                }
            }
            Err(err) => {
                tracing::warn!(host = %self.host.address, error = %err, "Command execution failed");
                // The channel is unusable; the next command reconnects.
                self.close().await;
                CommandOutput::not_run(err.to_string())
            }
        }
    }

    /// Releases the connection. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close().await;
            tracing::debug!(host = %self.host.address, "SSH session closed");
        }
        self.state = SessionState::Disconnected;
    }
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("host", &self.host.address)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
