//! Reconciliation pass, connection tests and manual refreshes

use std::sync::Arc;

use super::{Fixture, HookedStorage};
use dockwatch_core::error::{DockwatchError, StorageError};
use dockwatch_core::{ContainerStatus, ReconciliationEngine, Severity, Storage};
use uuid::Uuid;

#[tokio::test]
async fn test_first_pass_adds_containers_and_reconnects_host() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Exited (0) 3 days ago")]);

    let summary = fx.engine().run_reconciliation_pass().await;

    assert_eq!(summary.hosts.len(), 1);
    assert_eq!(summary.connected(), 1);
    assert_eq!(summary.failed(), 0);
    let report = &summary.hosts[0];
    assert_eq!(report.added, vec!["web".to_string(), "db".to_string()]);
    assert_eq!(report.updated, 0);
    assert!(report.removed.is_empty());

    let stored = fx.host(&host).await;
    assert!(stored.is_connected);
    assert!(stored.last_check.is_some());

    let web = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    assert_eq!(web.status, ContainerStatus::Running);
    assert_eq!(web.image, "nginx:1.27");
    assert_eq!(web.remote_id, "id-web");
    assert!(web.metrics.is_none());
    let db = fx.storage.find_container(host.id, "db").await.unwrap().unwrap();
    assert_eq!(db.status, ContainerStatus::Exited);

    assert_eq!(fx.messages(Severity::Success).await, vec!["Host edge-1 reconnected"]);
    assert_eq!(
        fx.messages(Severity::Info).await,
        vec!["New container detected: web", "New container detected: db"]
    );
    let detected = fx
        .events()
        .await
        .into_iter()
        .find(|e| e.message == "New container detected: web")
        .unwrap();
    assert_eq!(detected.host_id, Some(host.id));
    assert_eq!(detected.container_id, Some(web.id));
    assert!(detected.actor.is_none());
}

#[tokio::test]
async fn test_repeated_pass_is_quiet() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Up 5 minutes")]);
    let engine = fx.engine();

    engine.run_reconciliation_pass().await;
    let after_first = fx.events.len().await;
    let ids: Vec<Uuid> = fx
        .storage
        .list_containers(host.id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();

    let summary = engine.run_reconciliation_pass().await;

    assert_eq!(fx.events.len().await, after_first);
    assert_eq!(summary.hosts[0].updated, 2);
    assert!(summary.hosts[0].added.is_empty());
    let ids_again: Vec<Uuid> = fx
        .storage
        .list_containers(host.id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, ids_again);
}

#[tokio::test]
async fn test_inventory_converges_on_listing() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    let engine = fx.engine();

    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Up 2 hours")]);
    engine.run_reconciliation_pass().await;

    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours (Paused)"), ("cache", "Up 1 second")]);
    let summary = engine.run_reconciliation_pass().await;

    let report = &summary.hosts[0];
    assert_eq!(report.added, vec!["cache".to_string()]);
    assert_eq!(report.removed, vec!["db".to_string()]);
    assert_eq!(report.updated, 1);

    // Sorted by name
    assert_eq!(fx.container_names(&host).await, vec!["cache", "web"]);
    let web = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    // "Up" wins over "Paused" in status normalization
    assert_eq!(web.status, ContainerStatus::Running);

    let removed = fx
        .events()
        .await
        .into_iter()
        .find(|e| e.severity == Severity::Warning)
        .unwrap();
    assert_eq!(removed.message, "Container removed: db");
    assert_eq!(removed.host_id, Some(host.id));
    assert!(removed.container_id.is_none());
}

#[tokio::test]
async fn test_removal_is_reported_once() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    let engine = fx.engine();

    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Up 2 hours")]);
    engine.run_reconciliation_pass().await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    engine.run_reconciliation_pass().await;
    engine.run_reconciliation_pass().await;

    assert_eq!(
        fx.messages(Severity::Warning).await,
        vec!["Container removed: db"]
    );
    assert_eq!(fx.container_names(&host).await, vec!["web"]);
}

#[tokio::test]
async fn test_empty_listing_clears_inventory() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    let engine = fx.engine();

    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    engine.run_reconciliation_pass().await;
    fx.set_listing("10.0.0.5", &[]);
    let summary = engine.run_reconciliation_pass().await;

    assert_eq!(summary.hosts[0].removed, vec!["web".to_string()]);
    assert!(fx.container_names(&host).await.is_empty());
}

#[tokio::test]
async fn test_connectivity_flips_emit_one_event_each() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    let engine = fx.engine();

    engine.run_reconciliation_pass().await;

    fx.connector.set_reachable("10.0.0.5", false);
    let summary = engine.run_reconciliation_pass().await;
    engine.run_reconciliation_pass().await;

    assert!(!summary.hosts[0].connected);
    assert!(summary.hosts[0].error.is_none());
    assert_eq!(fx.messages(Severity::Warning).await, vec!["Host edge-1 disconnected"]);
    let stored = fx.host(&host).await;
    assert!(!stored.is_connected);
    // Unreachable hosts keep their last known inventory
    assert_eq!(fx.container_names(&host).await, vec!["web"]);

    fx.connector.set_reachable("10.0.0.5", true);
    engine.run_reconciliation_pass().await;

    assert_eq!(
        fx.messages(Severity::Success).await,
        vec!["Host edge-1 reconnected", "Host edge-1 reconnected"]
    );
    assert!(fx.host(&host).await.is_connected);
}

#[tokio::test]
async fn test_never_reachable_host_is_silent() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.connector.set_reachable("10.0.0.5", false);

    let summary = fx.engine().run_reconciliation_pass().await;

    assert_eq!(summary.connected(), 0);
    assert!(fx.events.is_empty().await);
    let stored = fx.host(&host).await;
    assert!(!stored.is_connected);
    assert!(stored.last_check.is_some());
}

#[tokio::test]
async fn test_listing_failure_keeps_inventory() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    let engine = fx.engine();

    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    engine.run_reconciliation_pass().await;
    fx.connector.fail(
        "10.0.0.5",
        &dockwatch_core::monitoring::listing_command("docker"),
        1,
        "Cannot connect to the Docker daemon",
    );

    let summary = engine.run_reconciliation_pass().await;

    let report = &summary.hosts[0];
    assert!(report.connected);
    assert_eq!(
        report.error.as_deref(),
        Some("Failed to get containers: Cannot connect to the Docker daemon")
    );
    assert_eq!(fx.container_names(&host).await, vec!["web"]);
    assert_eq!(
        fx.messages(Severity::Error).await,
        vec!["Error updating containers: Failed to get containers: Cannot connect to the Docker daemon"]
    );
    assert!(fx.host(&host).await.is_connected);
}

#[tokio::test]
async fn test_failing_host_does_not_stop_the_pass() {
    let fx = Fixture::new();
    let down = fx.add_host("edge-1", "10.0.0.5").await;
    let up = fx.add_host("edge-2", "10.0.0.6").await;
    fx.connector.set_reachable("10.0.0.5", false);
    fx.set_listing("10.0.0.6", &[("api", "Up 1 minute")]);

    let summary = fx.engine().run_reconciliation_pass().await;

    assert_eq!(summary.hosts.len(), 2);
    assert_eq!(summary.connected(), 1);
    assert!(!fx.host(&down).await.is_connected);
    assert!(fx.host(&up).await.is_connected);
    assert_eq!(fx.container_names(&up).await, vec!["api"]);
}

#[tokio::test]
async fn test_storage_failure_marks_host_disconnected() {
    let fx = Fixture::new();
    let broken = fx.add_host("edge-1", "10.0.0.5").await;
    let healthy = fx.add_host("edge-2", "10.0.0.6").await;
    let mut connected = broken.clone();
    connected.is_connected = true;
    fx.storage.save_host(&connected).await.unwrap();
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.set_listing("10.0.0.6", &[("api", "Up 1 minute")]);

    let storage = Arc::new(HookedStorage::new(fx.storage.clone()));
    storage.fail_upserts(broken.id);
    let engine = ReconciliationEngine::new(fx.client.clone(), storage, fx.events.clone());
    let summary = engine.run_reconciliation_pass().await;

    assert_eq!(summary.hosts.len(), 2);
    assert_eq!(summary.failed(), 1);
    let report = &summary.hosts[0];
    assert_eq!(report.host_id, broken.id);
    assert!(!report.connected);
    assert!(report.error.as_deref().unwrap().contains("disk full"));

    let stored = fx.host(&broken).await;
    assert!(!stored.is_connected);
    assert!(stored.last_check.is_some());
    assert!(fx.container_names(&broken).await.is_empty());

    let warnings: Vec<_> = fx
        .events()
        .await
        .into_iter()
        .filter(|e| e.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "Host edge-1 disconnected");
    assert_eq!(warnings[0].host_id, Some(broken.id));
    assert!(fx.messages(Severity::Error).await.is_empty());

    assert!(fx.host(&healthy).await.is_connected);
    assert_eq!(fx.container_names(&healthy).await, vec!["api"]);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    let mut listing = super::listing(&[("web", "Up 2 hours")]);
    listing.push_str("garbage line without delimiters\nshort|row\n");
    fx.connector.respond(
        "10.0.0.5",
        &dockwatch_core::monitoring::listing_command("docker"),
        &listing,
    );

    let summary = fx.engine().run_reconciliation_pass().await;

    assert!(summary.hosts[0].error.is_none());
    assert_eq!(fx.container_names(&host).await, vec!["web"]);
}

#[tokio::test]
async fn test_connection_test_records_actor() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;

    let result = fx
        .engine()
        .test_host_connection(host.id, Some("alice"))
        .await
        .unwrap();

    assert!(result.connected);
    assert_eq!(result.detail, "Docker version 27.0.1, build 6312585");
    let events = fx.events().await;
    let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Host edge-1 reconnected", "Connection to edge-1 succeeded"]
    );
    assert!(events.iter().all(|e| e.actor.as_deref() == Some("alice")));
    assert!(fx.host(&host).await.is_connected);
}

#[tokio::test]
async fn test_connection_test_failure() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.connector.set_reachable("10.0.0.5", false);

    let result = fx.engine().test_host_connection(host.id, None).await.unwrap();

    assert!(!result.connected);
    assert!(result.detail.contains("timed out"));
    assert!(fx.events.is_empty().await);
}

#[tokio::test]
async fn test_connection_test_unknown_host() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .test_host_connection(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DockwatchError::Storage(StorageError::HostNotFound(_))
    ));
}

#[tokio::test]
async fn test_refresh_inventory() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Up 2 hours")]);

    let report = fx
        .engine()
        .refresh_inventory(host.id, Some("alice"))
        .await
        .unwrap();

    assert!(report.connected);
    assert_eq!(report.added.len(), 2);
    assert_eq!(
        fx.events().await.last().map(|e| e.message.clone()),
        Some("Containers refreshed: 2 found".to_string())
    );
}

#[tokio::test]
async fn test_refresh_inventory_failure_marks_host_down() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    let engine = fx.engine();
    engine.run_reconciliation_pass().await;

    fx.connector.set_reachable("10.0.0.5", false);
    let err = engine.refresh_inventory(host.id, Some("alice")).await;

    assert!(matches!(err, Err(DockwatchError::Fetch(_))));
    assert!(!fx.host(&host).await.is_connected);
    assert_eq!(fx.container_names(&host).await, vec!["web"]);
    let errors = fx.messages(Severity::Error).await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error refreshing containers: "));
    assert_eq!(fx.messages(Severity::Warning).await, vec!["Host edge-1 disconnected"]);
}
