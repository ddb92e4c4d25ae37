//! JSON file storage adapter
//!
//! Every call reads the document, applies the change and writes it back
//! (temp file, then rename), so several `dockwatch` processes can share
//! one inventory with last-write-wins semantics.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{HostFilter, Inventory, Storage};
use crate::error::{StorageError, StorageResult};
use crate::models::{
    ActionRecord, ContainerMetrics, ContainerRecord, ContainerStatus, Host, ListingRow,
};

/// Inventory persisted as a single JSON document
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Uses `path` as the backing file; it is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document; a missing file is an empty inventory
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> StorageResult<Inventory> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Inventory::default()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Inventory::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, inventory: &Inventory) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(inventory)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        restrict_permissions(&tmp_path).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&Inventory) -> StorageResult<T>) -> StorageResult<T> {
        let _guard = self.lock.lock().await;
        let inventory = self.load().await?;
        f(&inventory)
    }

    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut Inventory) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let _guard = self.lock.lock().await;
        let mut inventory = self.load().await?;
        let value = f(&mut inventory)?;
        self.store(&inventory).await?;
        Ok(value)
    }
}

/// The document holds SSH passwords
#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_host(&self, id: Uuid) -> StorageResult<Host> {
        self.read(|inv| inv.get_host(id)).await
    }

    async fn save_host(&self, host: &Host) -> StorageResult<()> {
        self.modify(|inv| {
            inv.save_host(host);
            Ok(())
        })
        .await
    }

    async fn list_hosts(&self, filter: &HostFilter) -> StorageResult<Vec<Host>> {
        self.read(|inv| Ok(inv.list_hosts(filter))).await
    }

    async fn remove_host(&self, id: Uuid) -> StorageResult<()> {
        self.modify(|inv| inv.remove_host(id)).await
    }

    async fn upsert_container(
        &self,
        host_id: Uuid,
        row: &ListingRow,
    ) -> StorageResult<(ContainerRecord, bool)> {
        self.modify(|inv| inv.upsert_container(host_id, row)).await
    }

    async fn update_metrics(&self, id: Uuid, metrics: ContainerMetrics) -> StorageResult<()> {
        self.modify(|inv| inv.update_metrics(id, metrics)).await
    }

    async fn set_status(&self, id: Uuid, status: ContainerStatus) -> StorageResult<()> {
        self.modify(|inv| inv.set_status(id, status)).await
    }

    async fn delete_container(&self, id: Uuid) -> StorageResult<()> {
        self.modify(|inv| inv.delete_container(id)).await
    }

    async fn list_containers(&self, host_id: Uuid) -> StorageResult<Vec<ContainerRecord>> {
        self.read(|inv| Ok(inv.list_containers(host_id))).await
    }

    async fn find_container(
        &self,
        host_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<ContainerRecord>> {
        self.read(|inv| Ok(inv.find_container(host_id, name))).await
    }

    async fn get_container(&self, id: Uuid) -> StorageResult<ContainerRecord> {
        self.read(|inv| inv.get_container(id)).await
    }

    async fn save_action(&self, record: &ActionRecord) -> StorageResult<()> {
        self.modify(|inv| {
            inv.save_action(record);
            Ok(())
        })
        .await
    }

    async fn list_actions(&self, container_id: Option<Uuid>) -> StorageResult<Vec<ActionRecord>> {
        self.read(|inv| Ok(inv.list_actions(container_id))).await
    }
}
