//! File-backed inventory and activity log driven by real passes

use std::sync::Arc;

use dockwatch_core::monitoring::{listing_command, version_command};
use dockwatch_core::testing::ScriptedConnector;
use dockwatch_core::{
    ConfigManager, DockerClient, EventFilter, FileStorage, Host, HostFilter, JsonlEventSink,
    ReconciliationEngine, RuntimeSettings, Severity, Storage,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_pass_persists_through_files() {
    let dir = TempDir::new().unwrap();
    let config = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let storage = Arc::new(FileStorage::new(config.inventory_path()));
    let events = Arc::new(JsonlEventSink::new(config.events_path()));

    let host = Host::new("edge-1", "10.0.0.5", "ops");
    storage.save_host(&host).await.unwrap();

    let connector = Arc::new(ScriptedConnector::new());
    connector.respond("10.0.0.5", &version_command("docker"), "Docker version 27.0.1");
    connector.respond(
        "10.0.0.5",
        &listing_command("docker"),
        &super::listing(&[("web", "Up 1 hour"), ("db", "Up 1 hour")]),
    );
    let client = DockerClient::new(connector, RuntimeSettings::default());
    let engine = ReconciliationEngine::new(client, storage.clone(), events.clone());

    engine.run_reconciliation_pass().await;

    // A second process sees the same state
    let reopened = FileStorage::new(config.inventory_path());
    let hosts = reopened.list_hosts(&HostFilter::connected()).await.unwrap();
    assert_eq!(hosts.len(), 1);
    let names: Vec<String> = reopened
        .list_containers(host.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["db", "web"]);

    let log = JsonlEventSink::new(config.events_path());
    let recent = log.read_recent(&EventFilter::default()).await.unwrap();
    assert_eq!(recent.len(), 3);
    // Newest first
    assert_eq!(recent[0].message, "New container detected: db");
    assert_eq!(recent[2].message, "Host edge-1 reconnected");

    let warnings = log
        .read_recent(&EventFilter {
            severity: Some(Severity::Warning),
            ..EventFilter::default()
        })
        .await
        .unwrap();
    assert!(warnings.is_empty());
}

#[tokio::test]
async fn test_remove_host_cascades() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path().join("inventory.json"));
    let host = Host::new("edge-1", "10.0.0.5", "ops");
    let other = Host::new("edge-2", "10.0.0.6", "ops");
    storage.save_host(&host).await.unwrap();
    storage.save_host(&other).await.unwrap();

    let rows = dockwatch_core::OutputParser::parse_listing(&super::listing(&[("web", "Up 1 hour")]));
    storage.upsert_container(host.id, &rows[0]).await.unwrap();
    storage.upsert_container(other.id, &rows[0]).await.unwrap();

    storage.remove_host(host.id).await.unwrap();

    assert!(storage.list_containers(host.id).await.unwrap().is_empty());
    assert_eq!(storage.list_containers(other.id).await.unwrap().len(), 1);
    assert_eq!(
        storage
            .list_hosts(&HostFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect::<Vec<_>>(),
        vec!["edge-2"]
    );
}
