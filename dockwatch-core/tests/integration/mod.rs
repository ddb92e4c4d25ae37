//! Shared fixture for the integration tests

mod reconcile_tests;
mod stats_tests;
mod storage_tests;

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dockwatch_core::error::{StorageError, StorageResult};
use dockwatch_core::models::{ContainerMetrics, ListingRow};
use dockwatch_core::monitoring::{listing_command, stats_command, version_command};
use dockwatch_core::testing::ScriptedConnector;
use dockwatch_core::{
    ActionExecutor, ActionRecord, ActionService, ActivityEvent, ContainerRecord, ContainerStatus,
    DockerClient, Host, HostFilter, InMemoryStorage, LiveStats, MemoryEventSink,
    ReconciliationEngine, RuntimeSettings, Severity, StatsUpdater, Storage,
};
use uuid::Uuid;

/// Scripted hosts plus in-memory inventory and activity log
pub struct Fixture {
    pub connector: Arc<ScriptedConnector>,
    pub storage: Arc<InMemoryStorage>,
    pub events: Arc<MemoryEventSink>,
    pub client: DockerClient,
}

impl Fixture {
    pub fn new() -> Self {
        let connector = Arc::new(ScriptedConnector::new());
        let client = DockerClient::new(connector.clone(), RuntimeSettings::default());
        Self {
            connector,
            storage: Arc::new(InMemoryStorage::new()),
            events: Arc::new(MemoryEventSink::new()),
            client,
        }
    }

    /// Stores a host that answers the version probe
    pub async fn add_host(&self, name: &str, address: &str) -> Host {
        let host = Host::new(name, address, "ops").with_compose_path("/srv/app/docker-compose.yml");
        self.storage.save_host(&host).await.unwrap();
        self.connector
            .respond(address, &version_command("docker"), "Docker version 27.0.1, build 6312585");
        host
    }

    /// Scripts the container listing as `(name, status text)` rows
    pub fn set_listing(&self, address: &str, rows: &[(&str, &str)]) {
        self.connector
            .respond(address, &listing_command("docker"), &listing(rows));
    }

    /// Scripts the stats table as `(name, cpu, memory pair)` rows
    pub fn set_stats(&self, address: &str, rows: &[(&str, &str, &str)]) {
        let mut out = String::from("NAME|CPU %|MEM USAGE / LIMIT|NET I/O|BLOCK I/O\n");
        for (name, cpu, memory) in rows {
            writeln!(out, "{name}|{cpu}|{memory}|1.5kB / 2kB|0B / 0B").unwrap();
        }
        self.connector
            .respond(address, &stats_command("docker"), &out);
    }

    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.client.clone(), self.storage.clone(), self.events.clone())
    }

    pub fn stats(&self) -> StatsUpdater {
        StatsUpdater::new(self.client.clone(), self.storage.clone())
    }

    pub fn live(&self) -> LiveStats {
        LiveStats::new(self.client.clone(), self.storage.clone())
    }

    pub fn actions(&self) -> ActionService {
        ActionService::new(
            ActionExecutor::new(self.client.clone()),
            self.storage.clone(),
            self.events.clone(),
        )
    }

    pub async fn host(&self, host: &Host) -> Host {
        self.storage.get_host(host.id).await.unwrap()
    }

    pub async fn container_names(&self, host: &Host) -> Vec<String> {
        self.storage
            .list_containers(host.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    /// Events recorded so far, oldest first
    pub async fn events(&self) -> Vec<ActivityEvent> {
        self.events.events().await
    }

    pub async fn messages(&self, severity: Severity) -> Vec<String> {
        self.events()
            .await
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }
}

/// Formats a listing table with a header line
pub fn listing(rows: &[(&str, &str)]) -> String {
    let mut out = String::from("NAMES|STATUS|IMAGE|PORTS|CONTAINER ID|CREATED AT\n");
    for (name, status) in rows {
        writeln!(
            out,
            "{name}|{status}|nginx:1.27|0.0.0.0:8080->80/tcp|id-{name}|2024-05-01 10:00:00 +0000 UTC"
        )
        .unwrap();
    }
    out
}

/// Delegates to an in-memory inventory, with hooks for interleaved writes
/// and injected failures
pub struct HookedStorage {
    inner: Arc<InMemoryStorage>,
    /// Upserted right after the next `find_container` has read its result
    after_find: Mutex<Option<(Uuid, ListingRow)>>,
    /// Hosts whose container upserts fail
    failing_upserts: Mutex<Vec<Uuid>>,
}

impl HookedStorage {
    pub fn new(inner: Arc<InMemoryStorage>) -> Self {
        Self {
            inner,
            after_find: Mutex::new(None),
            failing_upserts: Mutex::new(Vec::new()),
        }
    }

    /// Lands `row` on `host_id` between the next lookup and whatever the
    /// caller writes back
    pub fn upsert_after_find(&self, host_id: Uuid, row: ListingRow) {
        *self.after_find.lock().unwrap() = Some((host_id, row));
    }

    pub fn fail_upserts(&self, host_id: Uuid) {
        self.failing_upserts.lock().unwrap().push(host_id);
    }
}

#[async_trait]
impl Storage for HookedStorage {
    async fn get_host(&self, id: Uuid) -> StorageResult<Host> {
        self.inner.get_host(id).await
    }

    async fn save_host(&self, host: &Host) -> StorageResult<()> {
        self.inner.save_host(host).await
    }

    async fn list_hosts(&self, filter: &HostFilter) -> StorageResult<Vec<Host>> {
        self.inner.list_hosts(filter).await
    }

    async fn remove_host(&self, id: Uuid) -> StorageResult<()> {
        self.inner.remove_host(id).await
    }

    async fn upsert_container(
        &self,
        host_id: Uuid,
        row: &ListingRow,
    ) -> StorageResult<(ContainerRecord, bool)> {
        let failing = self.failing_upserts.lock().unwrap().contains(&host_id);
        if failing {
            return Err(StorageError::Serialization("disk full".to_string()));
        }
        self.inner.upsert_container(host_id, row).await
    }

    async fn update_metrics(&self, id: Uuid, metrics: ContainerMetrics) -> StorageResult<()> {
        self.inner.update_metrics(id, metrics).await
    }

    async fn set_status(&self, id: Uuid, status: ContainerStatus) -> StorageResult<()> {
        self.inner.set_status(id, status).await
    }

    async fn delete_container(&self, id: Uuid) -> StorageResult<()> {
        self.inner.delete_container(id).await
    }

    async fn list_containers(&self, host_id: Uuid) -> StorageResult<Vec<ContainerRecord>> {
        self.inner.list_containers(host_id).await
    }

    async fn find_container(
        &self,
        host_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<ContainerRecord>> {
        let found = self.inner.find_container(host_id, name).await?;
        let pending = self.after_find.lock().unwrap().take();
        if let Some((host_id, row)) = pending {
            self.inner.upsert_container(host_id, &row).await?;
        }
        Ok(found)
    }

    async fn get_container(&self, id: Uuid) -> StorageResult<ContainerRecord> {
        self.inner.get_container(id).await
    }

    async fn save_action(&self, record: &ActionRecord) -> StorageResult<()> {
        self.inner.save_action(record).await
    }

    async fn list_actions(&self, container_id: Option<Uuid>) -> StorageResult<Vec<ActionRecord>> {
        self.inner.list_actions(container_id).await
    }
}

/// A listing row as the host would print it for `name`
pub fn listing_row(name: &str, status: ContainerStatus) -> ListingRow {
    ListingRow {
        name: name.to_string(),
        status,
        image: "nginx:1.27".to_string(),
        ports: "0.0.0.0:8080->80/tcp".to_string(),
        remote_id: format!("id-{name}"),
        created_at: "2024-05-01 10:00:00 +0000 UTC".to_string(),
    }
}
