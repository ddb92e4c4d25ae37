//! In-process storage adapter

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{HostFilter, Inventory, Storage};
use crate::error::StorageResult;
use crate::models::{
    ActionRecord, ContainerMetrics, ContainerRecord, ContainerStatus, Host, ListingRow,
};

/// Keeps the inventory in memory; nothing survives the process
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<Inventory>,
}

impl InMemoryStorage {
    /// Creates empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_host(&self, id: Uuid) -> StorageResult<Host> {
        self.inner.read().await.get_host(id)
    }

    async fn save_host(&self, host: &Host) -> StorageResult<()> {
        self.inner.write().await.save_host(host);
        Ok(())
    }

    async fn list_hosts(&self, filter: &HostFilter) -> StorageResult<Vec<Host>> {
        Ok(self.inner.read().await.list_hosts(filter))
    }

    async fn remove_host(&self, id: Uuid) -> StorageResult<()> {
        self.inner.write().await.remove_host(id)
    }

    async fn upsert_container(
        &self,
        host_id: Uuid,
        row: &ListingRow,
    ) -> StorageResult<(ContainerRecord, bool)> {
        self.inner.write().await.upsert_container(host_id, row)
    }

    async fn update_metrics(&self, id: Uuid, metrics: ContainerMetrics) -> StorageResult<()> {
        self.inner.write().await.update_metrics(id, metrics)
    }

    async fn set_status(&self, id: Uuid, status: ContainerStatus) -> StorageResult<()> {
        self.inner.write().await.set_status(id, status)
    }

    async fn delete_container(&self, id: Uuid) -> StorageResult<()> {
        self.inner.write().await.delete_container(id)
    }

    async fn list_containers(&self, host_id: Uuid) -> StorageResult<Vec<ContainerRecord>> {
        Ok(self.inner.read().await.list_containers(host_id))
    }

    async fn find_container(
        &self,
        host_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<ContainerRecord>> {
        Ok(self.inner.read().await.find_container(host_id, name))
    }

    async fn get_container(&self, id: Uuid) -> StorageResult<ContainerRecord> {
        self.inner.read().await.get_container(id)
    }

    async fn save_action(&self, record: &ActionRecord) -> StorageResult<()> {
        self.inner.write().await.save_action(record);
        Ok(())
    }

    async fn list_actions(&self, container_id: Option<Uuid>) -> StorageResult<Vec<ActionRecord>> {
        Ok(self.inner.read().await.list_actions(container_id))
    }
}
