//! Container inventory records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized container status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// Container is up
    Running,
    /// Stopped through a `stop` action
    Stopped,
    /// Paused
    Paused,
    /// Exited on its own or after a stop
    Exited,
    /// Restarting
    Restarting,
    /// Dead
    Dead,
    /// Status text was not recognized
    #[default]
    Unknown,
}

impl ContainerStatus {
    /// All statuses, in declaration order
    pub const ALL: [Self; 7] = [
        Self::Running,
        Self::Stopped,
        Self::Paused,
        Self::Exited,
        Self::Restarting,
        Self::Dead,
        Self::Unknown,
    ];

    /// Returns the status as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Exited => "exited",
            Self::Restarting => "restarting",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource usage sampled by a stats pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerMetrics {
    /// CPU usage in percent (may exceed 100 on multi-core hosts)
    pub cpu_percent: f64,
    /// Memory in use, bytes
    pub memory_usage_bytes: u64,
    /// Memory limit, bytes
    pub memory_limit_bytes: u64,
    /// Bytes received
    pub network_rx_bytes: u64,
    /// Bytes sent
    pub network_tx_bytes: u64,
}

impl ContainerMetrics {
    /// Memory usage as a percentage of the limit (0 when no limit is known)
    #[must_use]
    pub fn memory_percent(&self) -> f64 {
        if self.memory_limit_bytes == 0 {
            0.0
        } else {
            self.memory_usage_bytes as f64 / self.memory_limit_bytes as f64 * 100.0
        }
    }
}

/// One row of the remote container listing, already normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    /// Container name, unique per host
    pub name: String,
    /// Normalized status
    pub status: ContainerStatus,
    /// Image reference
    pub image: String,
    /// Port descriptor, free text
    pub ports: String,
    /// Runtime-assigned container ID
    pub remote_id: String,
    /// Creation time as printed by the host
    pub created_at: String,
}

/// Locally stored representation of a container observed on a host.
///
/// Unique by `(host_id, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Local identifier
    pub id: Uuid,
    /// Owning host
    pub host_id: Uuid,
    /// Container name
    pub name: String,
    /// Runtime-assigned container ID
    pub remote_id: String,
    /// Image reference
    pub image: String,
    /// Normalized status
    pub status: ContainerStatus,
    /// Port descriptor
    #[serde(default)]
    pub ports: String,
    /// Opaque creation-time string supplied by the host
    #[serde(default)]
    pub created_at: String,
    /// Latest resource sample, `None` until the first stats pass
    #[serde(default)]
    pub metrics: Option<ContainerMetrics>,
    /// When any field was last written
    pub last_updated: DateTime<Utc>,
}

impl ContainerRecord {
    /// Creates a record from a listing row
    #[must_use]
    pub fn from_listing(host_id: Uuid, row: &ListingRow) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id,
            name: row.name.clone(),
            remote_id: row.remote_id.clone(),
            image: row.image.clone(),
            status: row.status,
            ports: row.ports.clone(),
            created_at: row.created_at.clone(),
            metrics: None,
            last_updated: Utc::now(),
        }
    }

    /// Overwrites the listing-derived fields.
    ///
    /// Returns `true` if anything changed.
    pub fn apply_listing(&mut self, row: &ListingRow) -> bool {
        let changed = self.remote_id != row.remote_id
            || self.image != row.image
            || self.status != row.status
            || self.ports != row.ports
            || self.created_at != row.created_at;

        self.remote_id.clone_from(&row.remote_id);
        self.image.clone_from(&row.image);
        self.status = row.status;
        self.ports.clone_from(&row.ports);
        self.created_at.clone_from(&row.created_at);
        self.last_updated = Utc::now();
        changed
    }

    /// Overwrites the metric fields only
    pub fn apply_metrics(&mut self, metrics: ContainerMetrics) {
        self.metrics = Some(metrics);
        self.last_updated = Utc::now();
    }
}
