//! Action requests with their audit trail
//!
//! [`ActionService::perform`] wraps [`ActionExecutor`] with an
//! [`ActionRecord`], the resulting container status write and an
//! activity event.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::executor::ActionExecutor;
use crate::error::{ActionError, DockwatchResult, StorageError, StorageResult};
use crate::events::EventSink;
use crate::models::{
    ActionKind, ActionRecord, ActionStatus, ActivityEvent, ContainerRecord, ContainerStatus, Host,
    Severity,
};
use crate::storage::Storage;
use crate::tracing::span_names;

/// Status a container is left in after a successful action, if it changes
#[must_use]
pub const fn status_after(action: ActionKind) -> Option<ContainerStatus> {
    match action {
        ActionKind::Start | ActionKind::Restart | ActionKind::Unpause => {
            Some(ContainerStatus::Running)
        }
        ActionKind::Stop => Some(ContainerStatus::Stopped),
        ActionKind::Pause => Some(ContainerStatus::Paused),
        ActionKind::Remove | ActionKind::Rebuild => None,
    }
}

/// Treats a record deleted by a concurrent pass as already handled
fn ignore_missing(result: StorageResult<()>) -> StorageResult<()> {
    match result {
        Err(StorageError::ContainerNotFound(id)) => {
            tracing::debug!(container_id = %id, "Container record already gone");
            Ok(())
        }
        other => other,
    }
}

/// Executes actions requested against stored containers
pub struct ActionService {
    executor: ActionExecutor,
    storage: Arc<dyn Storage>,
    events: Arc<dyn EventSink>,
}

impl ActionService {
    /// Creates the service
    #[must_use]
    pub fn new(
        executor: ActionExecutor,
        storage: Arc<dyn Storage>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            executor,
            storage,
            events,
        }
    }

    /// Runs `action` on the stored container `container_id` for `actor`.
    ///
    /// Returns the completed record; a failed remote command is a
    /// `failed` record, not an error. Unknown actions are rejected before
    /// any record is created.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown actions, missing containers or hosts,
    /// and storage failures.
    pub async fn perform(
        &self,
        container_id: Uuid,
        action: &str,
        actor: &str,
    ) -> DockwatchResult<ActionRecord> {
        let kind: ActionKind = action.parse()?;
        let container = self.storage.get_container(container_id).await?;
        let host = self.storage.get_host(container.host_id).await?;

        let span = crate::trace_operation!(
            span_names::ACTION_PERFORM,
            host = %host.name,
            container = %container.name,
            action = %kind,
            actor
        );
        self.run(kind, &host, &container, actor)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        kind: ActionKind,
        host: &Host,
        container: &ContainerRecord,
        actor: &str,
    ) -> DockwatchResult<ActionRecord> {
        let mut record = ActionRecord::pending(container.id, &container.name, kind, actor);
        self.storage.save_action(&record).await?;
        record.transition(ActionStatus::Executing)?;
        self.storage.save_action(&record).await?;

        let outcome = self.executor.execute_kind(host, &container.name, kind).await;
        record.complete(outcome.success, outcome.message.clone())?;
        self.storage.save_action(&record).await?;

        if !outcome.success {
            self.events
                .record(
                    ActivityEvent::new(
                        Severity::Error,
                        format!(
                            "Error executing {kind} on {}: {}",
                            container.name, outcome.message
                        ),
                    )
                    .with_host(host.id)
                    .with_container(container.id)
                    .with_actor(Some(actor)),
                )
                .await;
            return Ok(record);
        }

        // A reconciliation pass may have removed the record meanwhile.
        let current = self
            .storage
            .find_container(host.id, &container.name)
            .await?
            .filter(|c| c.id == container.id);

        let Some(current) = current else {
            tracing::info!("Container disappeared while the action ran");
            self.events
                .record(
                    ActivityEvent::new(
                        Severity::Success,
                        format!("Action {kind} executed on {}", container.name),
                    )
                    .with_host(host.id)
                    .with_actor(Some(actor)),
                )
                .await;
            return Ok(record);
        };

        let message = if kind == ActionKind::Remove {
            ignore_missing(self.storage.delete_container(current.id).await)?;
            format!("Container {} removed", container.name)
        } else {
            if let Some(status) = status_after(kind) {
                ignore_missing(self.storage.set_status(current.id, status).await)?;
            }
            format!("Action {kind} executed on {}", container.name)
        };

        self.events
            .record(
                ActivityEvent::new(Severity::Success, message)
                    .with_host(host.id)
                    .with_container(container.id)
                    .with_actor(Some(actor)),
            )
            .await;
        Ok(record)
    }

    /// Rejects `action` early if it is not a known action name
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Unknown`] for anything but the seven actions.
    pub fn validate(action: &str) -> Result<ActionKind, ActionError> {
        action.parse()
    }
}

impl std::fmt::Debug for ActionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionService")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}
