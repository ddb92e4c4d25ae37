//! Plain inventory state shared by the storage adapters

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HostFilter;
use crate::error::{StorageError, StorageResult};
use crate::models::{
    ActionRecord, ContainerMetrics, ContainerRecord, ContainerStatus, Host, ListingRow,
};

/// Everything the storage layer holds, as one serializable document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Hosts in insertion order
    #[serde(default)]
    pub hosts: Vec<Host>,
    /// Container records of every host
    #[serde(default)]
    pub containers: Vec<ContainerRecord>,
    /// Action audit records
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl Inventory {
    pub(crate) fn get_host(&self, id: Uuid) -> StorageResult<Host> {
        self.hosts
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or(StorageError::HostNotFound(id))
    }

    pub(crate) fn save_host(&mut self, host: &Host) {
        match self.hosts.iter_mut().find(|h| h.id == host.id) {
            Some(existing) => *existing = host.clone(),
            None => self.hosts.push(host.clone()),
        }
    }

    pub(crate) fn list_hosts(&self, filter: &HostFilter) -> Vec<Host> {
        self.hosts
            .iter()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect()
    }

    pub(crate) fn remove_host(&mut self, id: Uuid) -> StorageResult<()> {
        let before = self.hosts.len();
        self.hosts.retain(|h| h.id != id);
        if self.hosts.len() == before {
            return Err(StorageError::HostNotFound(id));
        }
        let removed: Vec<Uuid> = self
            .containers
            .iter()
            .filter(|c| c.host_id == id)
            .map(|c| c.id)
            .collect();
        self.containers.retain(|c| c.host_id != id);
        self.actions.retain(|a| !removed.contains(&a.container_id));
        Ok(())
    }

    pub(crate) fn upsert_container(
        &mut self,
        host_id: Uuid,
        row: &ListingRow,
    ) -> StorageResult<(ContainerRecord, bool)> {
        if !self.hosts.iter().any(|h| h.id == host_id) {
            return Err(StorageError::HostNotFound(host_id));
        }
        if let Some(existing) = self
            .containers
            .iter_mut()
            .find(|c| c.host_id == host_id && c.name == row.name)
        {
            existing.apply_listing(row);
            return Ok((existing.clone(), false));
        }
        let record = ContainerRecord::from_listing(host_id, row);
        self.containers.push(record.clone());
        Ok((record, true))
    }

    pub(crate) fn update_metrics(
        &mut self,
        id: Uuid,
        metrics: ContainerMetrics,
    ) -> StorageResult<()> {
        self.container_mut(id)?.apply_metrics(metrics);
        Ok(())
    }

    pub(crate) fn set_status(&mut self, id: Uuid, status: ContainerStatus) -> StorageResult<()> {
        let record = self.container_mut(id)?;
        record.status = status;
        record.last_updated = Utc::now();
        Ok(())
    }

    fn container_mut(&mut self, id: Uuid) -> StorageResult<&mut ContainerRecord> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StorageError::ContainerNotFound(id))
    }

    pub(crate) fn delete_container(&mut self, id: Uuid) -> StorageResult<()> {
        let before = self.containers.len();
        self.containers.retain(|c| c.id != id);
        if self.containers.len() == before {
            return Err(StorageError::ContainerNotFound(id));
        }
        Ok(())
    }

    pub(crate) fn list_containers(&self, host_id: Uuid) -> Vec<ContainerRecord> {
        let mut records: Vec<ContainerRecord> = self
            .containers
            .iter()
            .filter(|c| c.host_id == host_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub(crate) fn find_container(&self, host_id: Uuid, name: &str) -> Option<ContainerRecord> {
        self.containers
            .iter()
            .find(|c| c.host_id == host_id && c.name == name)
            .cloned()
    }

    pub(crate) fn get_container(&self, id: Uuid) -> StorageResult<ContainerRecord> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StorageError::ContainerNotFound(id))
    }

    pub(crate) fn save_action(&mut self, record: &ActionRecord) {
        match self.actions.iter_mut().find(|a| a.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.actions.push(record.clone()),
        }
    }

    pub(crate) fn list_actions(&self, container_id: Option<Uuid>) -> Vec<ActionRecord> {
        let mut records: Vec<ActionRecord> = self
            .actions
            .iter()
            .filter(|a| container_id.is_none_or(|id| a.container_id == id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        records
    }
}
