//! Append-only activity events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Something went right
    Success,
    /// Something needs attention
    Warning,
    /// Something failed
    Error,
}

impl Severity {
    /// Returns the severity as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit entry describing a state change or failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Identifier
    pub id: Uuid,
    /// Related host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<Uuid>,
    /// Related container record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<Uuid>,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Who triggered it, `None` for periodic passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    /// Creates an event with no references
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id: None,
            container_id: None,
            severity,
            message: message.into(),
            actor: None,
            timestamp: Utc::now(),
        }
    }

    /// Attaches a host reference
    #[must_use]
    pub const fn with_host(mut self, host_id: Uuid) -> Self {
        self.host_id = Some(host_id);
        self
    }

    /// Attaches a container reference
    #[must_use]
    pub const fn with_container(mut self, container_id: Uuid) -> Self {
        self.container_id = Some(container_id);
        self
    }

    /// Attaches the actor, if any
    #[must_use]
    pub fn with_actor(mut self, actor: Option<&str>) -> Self {
        self.actor = actor.map(str::to_string);
        self
    }
}
