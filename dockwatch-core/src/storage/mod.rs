//! Persistence boundary for hosts, container records and action records
//!
//! Monitoring passes depend only on the [`Storage`] trait. Two adapters
//! ship with the crate: [`InMemoryStorage`] for tests and embedding, and
//! [`FileStorage`], a single JSON document rewritten atomically on every
//! change.

mod file;
mod inventory;
mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::models::{
    ActionRecord, ContainerMetrics, ContainerRecord, ContainerStatus, Host, ListingRow,
};

pub use file::FileStorage;
pub use inventory::Inventory;
pub use memory::InMemoryStorage;

/// Selects hosts in [`Storage::list_hosts`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFilter {
    /// Only hosts whose connectivity flag matches
    pub connected: Option<bool>,
    /// Only the host with this exact name
    pub name: Option<String>,
}

impl HostFilter {
    /// Every host
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Hosts whose last probe succeeded
    #[must_use]
    pub fn connected() -> Self {
        Self {
            connected: Some(true),
            name: None,
        }
    }

    /// Returns `true` if `host` passes the filter
    #[must_use]
    pub fn matches(&self, host: &Host) -> bool {
        self.connected.is_none_or(|c| host.is_connected == c)
            && self.name.as_deref().is_none_or(|n| host.name == n)
    }
}

/// Storage collaborator used by the monitoring passes and the action service
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads one host
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound` if no host has this ID.
    async fn get_host(&self, id: Uuid) -> StorageResult<Host>;

    /// Inserts or replaces a host
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn save_host(&self, host: &Host) -> StorageResult<()>;

    /// Lists hosts matching `filter`, in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn list_hosts(&self, filter: &HostFilter) -> StorageResult<Vec<Host>>;

    /// Removes a host together with its container records
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound` if no host has this ID.
    async fn remove_host(&self, id: Uuid) -> StorageResult<()>;

    /// Creates or updates the record keyed by (`host_id`, `row.name`).
    ///
    /// Returns the stored record and `true` if it was newly created.
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound` if the host does not exist.
    async fn upsert_container(
        &self,
        host_id: Uuid,
        row: &ListingRow,
    ) -> StorageResult<(ContainerRecord, bool)>;

    /// Overwrites the metric fields of an existing record, leaving the rest
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` if the record no longer exists.
    async fn update_metrics(&self, id: Uuid, metrics: ContainerMetrics) -> StorageResult<()>;

    /// Sets the status of an existing record, leaving the rest
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` if the record no longer exists.
    async fn set_status(&self, id: Uuid, status: ContainerStatus) -> StorageResult<()>;

    /// Deletes one record
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` if the record does not exist.
    async fn delete_container(&self, id: Uuid) -> StorageResult<()>;

    /// Lists the records of one host, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn list_containers(&self, host_id: Uuid) -> StorageResult<Vec<ContainerRecord>>;

    /// Looks up a record by (`host_id`, `name`)
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn find_container(
        &self,
        host_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<ContainerRecord>>;

    /// Loads one record
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` if no record has this ID.
    async fn get_container(&self, id: Uuid) -> StorageResult<ContainerRecord>;

    /// Inserts or replaces an action record
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn save_action(&self, record: &ActionRecord) -> StorageResult<()>;

    /// Lists action records, newest first, optionally for one container
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn list_actions(&self, container_id: Option<Uuid>) -> StorageResult<Vec<ActionRecord>>;
}
