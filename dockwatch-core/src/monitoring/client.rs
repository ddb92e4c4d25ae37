//! Fetch operations against a host's container runtime
//!
//! Every call opens its own [`RemoteSession`] and closes it before
//! returning. Failures come back as [`FetchError`] for the caller to turn
//! into events; malformed output is never an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::parser::{self, OutputParser};
use super::settings::RuntimeSettings;
use crate::action::commands::{compose_dir, is_valid_container_name, shell_quote};
use crate::error::FetchError;
use crate::models::{ContainerMetrics, Host, ListingRow};
use crate::remote::{CommandOutput, Connector, RemoteSession};

/// Runs inspection commands on hosts
#[derive(Clone)]
pub struct DockerClient {
    connector: Arc<dyn Connector>,
    runtime: RuntimeSettings,
}

impl DockerClient {
    /// Creates a client that dials hosts through `connector`
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, runtime: RuntimeSettings) -> Self {
        Self { connector, runtime }
    }

    /// The transport used for new sessions
    #[must_use]
    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::clone(&self.connector)
    }

    /// Command spelling and timeouts
    #[must_use]
    pub const fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    /// Creates a disconnected session for `host`
    #[must_use]
    pub fn session(&self, host: &Host) -> RemoteSession {
        RemoteSession::new(
            self.connector(),
            host.clone(),
            self.runtime.effective_connect_timeout(),
        )
    }

    /// Connects and runs the version probe, returning the version line.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Connection`] if no session could be opened and
    /// [`FetchError::Command`] if the runtime is missing or broken.
    pub async fn probe(&self, host: &Host) -> Result<String, FetchError> {
        self.fetch(host, "check runtime version", &parser::version_command(&self.runtime.binary))
            .await
    }

    /// Returns `true` if the host answers the version probe
    pub async fn test_connection(&self, host: &Host) -> bool {
        match self.probe(host).await {
            Ok(version) => {
                tracing::debug!(host = %host.address, version = %version, "Host reachable");
                true
            }
            Err(err) => {
                tracing::debug!(host = %host.address, error = %err, "Host unreachable");
                false
            }
        }
    }

    /// Lists every container on the host, running or not
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the session or the listing command fails.
    pub async fn list_containers(&self, host: &Host) -> Result<Vec<ListingRow>, FetchError> {
        let stdout = self
            .fetch(host, "get containers", &parser::listing_command(&self.runtime.binary))
            .await?;
        Ok(OutputParser::parse_listing(&stdout))
    }

    /// Takes one stats sample of every running container
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the session or the stats command fails.
    pub async fn container_stats(
        &self,
        host: &Host,
    ) -> Result<BTreeMap<String, ContainerMetrics>, FetchError> {
        let stdout = self
            .fetch(host, "get container stats", &parser::stats_command(&self.runtime.binary))
            .await?;
        Ok(OutputParser::parse_stats(&stdout))
    }

    /// Fetches the last `lines` log lines of a container, or the
    /// configured default when `lines` is `None`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidName`] without contacting the host if
    /// `name` is not a valid container name, otherwise any session or
    /// command failure.
    pub async fn container_logs(
        &self,
        host: &Host,
        name: &str,
        lines: Option<u32>,
    ) -> Result<String, FetchError> {
        if !is_valid_container_name(name) {
            return Err(FetchError::InvalidName(name.to_string()));
        }
        let lines = lines
            .filter(|n| *n > 0)
            .unwrap_or_else(|| self.runtime.effective_log_tail_lines());
        let command = parser::logs_command(
            &self.runtime.binary,
            &self.runtime.compose_binary,
            &shell_quote(compose_dir(&host.compose_path)),
            name,
            lines,
        );
        self.fetch(host, "get logs", &command).await
    }

    async fn fetch(
        &self,
        host: &Host,
        operation: &'static str,
        command: &str,
    ) -> Result<String, FetchError> {
        let mut session = RemoteSession::open(
            self.connector(),
            host.clone(),
            self.runtime.effective_connect_timeout(),
        )
        .await?;
        let output = session.execute(command).await;
        session.close().await;
        into_stdout(operation, output)
    }
}

impl std::fmt::Debug for DockerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerClient")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

fn into_stdout(operation: &'static str, output: CommandOutput) -> Result<String, FetchError> {
    if output.success {
        return Ok(output.stdout);
    }
    let message = if output.stderr.is_empty() {
        format!("command exited with status {}", output.exit_code)
    } else {
        output.stderr
    };
    Err(FetchError::Command {
        operation,
        message,
        exit_code: output.exit_code,
    })
}
