//! Container lifecycle actions and their audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionError;

/// A lifecycle operation requested against a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Start through compose, falling back to the runtime
    Start,
    /// Stop
    Stop,
    /// Restart
    Restart,
    /// Pause
    Pause,
    /// Unpause
    Unpause,
    /// Stop and force-remove
    Remove,
    /// Rebuild and recreate through compose
    Rebuild,
}

impl ActionKind {
    /// All known actions
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::Pause,
        Self::Unpause,
        Self::Remove,
        Self::Rebuild,
    ];

    /// Returns the action as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Remove => "remove",
            Self::Rebuild => "rebuild",
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ActionError::Unknown(s.to_string()))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an [`ActionRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// Recorded, not yet sent
    #[default]
    Pending,
    /// Remote command in flight
    Executing,
    /// Remote command succeeded
    Success,
    /// Remote command failed
    Failed,
}

impl ActionStatus {
    /// Whether the status is final
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Executing | Self::Success | Self::Failed)
                | (Self::Executing, Self::Success | Self::Failed)
        )
    }

    /// Returns the status as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one action request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Identifier
    pub id: Uuid,
    /// Target container record
    pub container_id: Uuid,
    /// Target container name at request time
    pub container_name: String,
    /// Requested action
    pub action: ActionKind,
    /// Current status
    pub status: ActionStatus,
    /// Result message from the remote side
    #[serde(default)]
    pub result_message: String,
    /// Who asked for it
    pub actor: String,
    /// When the request was recorded
    pub issued_at: DateTime<Utc>,
    /// When the remote command finished
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActionRecord {
    /// Creates a `pending` record
    #[must_use]
    pub fn pending(
        container_id: Uuid,
        container_name: impl Into<String>,
        action: ActionKind,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            container_id,
            container_name: container_name.into(),
            action,
            status: ActionStatus::Pending,
            result_message: String::new(),
            actor: actor.into(),
            issued_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Moves the record to `next`.
    ///
    /// Terminal statuses stamp `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidTransition`] if `next` would move the
    /// lifecycle backwards or out of a terminal status.
    pub fn transition(&mut self, next: ActionStatus) -> Result<(), ActionError> {
        if !self.status.can_transition_to(next) {
            return Err(ActionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Completes the record with the remote outcome
    ///
    /// # Errors
    ///
    /// See [`ActionRecord::transition`].
    pub fn complete(&mut self, success: bool, message: impl Into<String>) -> Result<(), ActionError> {
        let next = if success {
            ActionStatus::Success
        } else {
            ActionStatus::Failed
        };
        self.transition(next)?;
        self.result_message = message.into();
        Ok(())
    }
}
