//! Runs container actions on a host
//!
//! Unlike fetch operations, execution never returns an error: every
//! outcome, including an unknown action or an unreachable host, is an
//! [`ActionOutcome`].

use tracing::Instrument;

use super::commands::{action_command, is_valid_container_name};
use crate::models::{ActionKind, Host};
use crate::monitoring::DockerClient;
use crate::tracing::span_names;

/// Result of one action, as reported to the requester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the remote command succeeded
    pub success: bool,
    /// Success message or the remote error text
    pub message: String,
}

impl ActionOutcome {
    /// A failed outcome with `message`
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Maps actions onto remote commands and runs them
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    client: DockerClient,
}

impl ActionExecutor {
    /// Creates an executor that reaches hosts through `client`
    #[must_use]
    pub const fn new(client: DockerClient) -> Self {
        Self { client }
    }

    /// Runs `action` (a lowercase action name) on `container_name`.
    ///
    /// Unknown actions fail without contacting the host.
    pub async fn execute(&self, host: &Host, container_name: &str, action: &str) -> ActionOutcome {
        match action.parse::<ActionKind>() {
            Ok(kind) => self.execute_kind(host, container_name, kind).await,
            Err(err) => {
                tracing::warn!(host = %host.name, action, "Rejected unknown action");
                ActionOutcome::failed(err.to_string())
            }
        }
    }

    /// Runs a known action on `container_name` over a fresh session
    pub async fn execute_kind(
        &self,
        host: &Host,
        container_name: &str,
        action: ActionKind,
    ) -> ActionOutcome {
        if !is_valid_container_name(container_name) {
            tracing::warn!(host = %host.name, container = container_name, "Rejected container name");
            return ActionOutcome::failed(format!("Invalid container name: {container_name:?}"));
        }

        let runtime = self.client.runtime();
        let command = action_command(
            &runtime.binary,
            &runtime.compose_binary,
            &host.compose_path,
            container_name,
            action,
        );

        let span = crate::trace_operation!(
            span_names::ACTION_EXECUTE,
            host = %host.name,
            container = container_name,
            action = %action
        );
        async {
            let mut session = self.client.session(host);
            let output = session.execute(&command).await;
            session.close().await;

            if output.success {
                tracing::info!("Action completed");
                ActionOutcome {
                    success: true,
                    message: format!("Action {action} completed successfully"),
                }
            } else {
                tracing::warn!(exit_code = output.exit_code, stderr = %output.stderr, "Action failed");
                let message = if output.stderr.is_empty() {
                    "Action failed".to_string()
                } else {
                    output.stderr
                };
                ActionOutcome::failed(message)
            }
        }
        .instrument(span)
        .await
    }
}
