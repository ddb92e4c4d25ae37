//! Stats pass and live stats

use std::sync::Arc;

use super::{Fixture, HookedStorage, listing_row};
use dockwatch_core::{ContainerStatus, StatsUpdater, Storage};
use uuid::Uuid;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

#[tokio::test]
async fn test_stats_pass_writes_metrics_only() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours"), ("db", "Exited (1) 1 hour ago")]);
    fx.engine().run_reconciliation_pass().await;
    let events_before = fx.events.len().await;

    fx.set_stats(
        "10.0.0.5",
        &[("web", "12.50%", "256MiB / 1GiB"), ("db", "0.00%", "0B / 0B")],
    );
    let reports = fx.stats().run_stats_pass().await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].updated, 2);
    assert_eq!(reports[0].skipped, 0);
    assert!(reports[0].error.is_none());

    let web = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    let metrics = web.metrics.unwrap();
    assert!((metrics.cpu_percent - 12.5).abs() < f64::EPSILON);
    assert_eq!(metrics.memory_usage_bytes, 256 * MIB);
    assert_eq!(metrics.memory_limit_bytes, GIB);
    assert_eq!(metrics.network_rx_bytes, 1536);
    assert_eq!(metrics.network_tx_bytes, 2048);
    assert_eq!(web.status, ContainerStatus::Running);

    let db = fx.storage.find_container(host.id, "db").await.unwrap().unwrap();
    assert_eq!(db.status, ContainerStatus::Exited);

    assert_eq!(fx.events.len().await, events_before);
    assert!(fx.host(&host).await.is_connected);
}

#[tokio::test]
async fn test_stats_pass_skips_unknown_containers() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;

    fx.set_stats(
        "10.0.0.5",
        &[("web", "1%", "1MiB / 2MiB"), ("sidecar", "3%", "1MiB / 2MiB")],
    );
    let reports = fx.stats().run_stats_pass().await;

    assert_eq!(reports[0].updated, 1);
    assert_eq!(reports[0].skipped, 1);
    assert_eq!(fx.container_names(&host).await, vec!["web"]);
}

#[tokio::test]
async fn test_stats_pass_keeps_status_written_meanwhile() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;

    // A reconciliation lands between the stats lookup and its write
    let storage = Arc::new(HookedStorage::new(fx.storage.clone()));
    storage.upsert_after_find(host.id, listing_row("web", ContainerStatus::Exited));
    fx.set_stats("10.0.0.5", &[("web", "7.25%", "64MiB / 1GiB")]);
    let reports = StatsUpdater::new(fx.client.clone(), storage)
        .run_stats_pass()
        .await;

    assert_eq!(reports[0].updated, 1);
    let web = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    assert_eq!(web.status, ContainerStatus::Exited);
    let metrics = web.metrics.unwrap();
    assert!((metrics.cpu_percent - 7.25).abs() < f64::EPSILON);
    assert_eq!(metrics.memory_usage_bytes, 64 * MIB);
}

#[tokio::test]
async fn test_stats_pass_ignores_disconnected_hosts() {
    let fx = Fixture::new();
    fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_stats("10.0.0.5", &[("web", "1%", "1MiB / 2MiB")]);

    // Never reconciled, so never marked connected
    let reports = fx.stats().run_stats_pass().await;

    assert!(reports.is_empty());
    assert!(fx.connector.commands("10.0.0.5").is_empty());
}

#[tokio::test]
async fn test_stats_failure_changes_nothing() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;
    let events_before = fx.events.len().await;
    let before = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();

    fx.connector.set_reachable("10.0.0.5", false);
    let reports = fx.stats().run_stats_pass().await;

    assert_eq!(reports.len(), 1);
    assert!(reports[0].error.as_deref().unwrap().contains("timed out"));
    assert_eq!(fx.events.len().await, events_before);
    // Connectivity belongs to the reconciliation pass
    assert!(fx.host(&host).await.is_connected);
    let after = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_one_host_failure_does_not_stop_stats_pass() {
    let fx = Fixture::new();
    let a = fx.add_host("edge-1", "10.0.0.5").await;
    let b = fx.add_host("edge-2", "10.0.0.6").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.set_listing("10.0.0.6", &[("api", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;

    fx.connector.fail(
        "10.0.0.5",
        &dockwatch_core::monitoring::stats_command("docker"),
        1,
        "daemon gone",
    );
    fx.set_stats("10.0.0.6", &[("api", "7.25%", "10MiB / 100MiB")]);
    let reports = fx.stats().run_stats_pass().await;

    let failed = reports.iter().find(|r| r.host_id == a.id).unwrap();
    assert_eq!(
        failed.error.as_deref(),
        Some("Failed to get container stats: daemon gone")
    );
    let ok = reports.iter().find(|r| r.host_id == b.id).unwrap();
    assert_eq!(ok.updated, 1);
    let api = fx.storage.find_container(b.id, "api").await.unwrap().unwrap();
    assert!(api.metrics.is_some());
}

#[tokio::test]
async fn test_refresh_host_returns_sample() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;
    fx.set_stats("10.0.0.5", &[("web", "50%", "1GiB / 2GiB")]);

    let sample = fx.stats().refresh_host(host.id).await.unwrap();

    assert_eq!(sample.len(), 1);
    assert!((sample["web"].memory_percent() - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_live_stats_do_not_touch_storage() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.set_listing("10.0.0.5", &[("web", "Up 2 hours")]);
    fx.engine().run_reconciliation_pass().await;
    fx.set_stats("10.0.0.5", &[("web", "3.5%", "64MiB / 512MiB")]);

    let sample = fx.live().current_stats(host.id).await;

    assert_eq!(sample.len(), 1);
    assert_eq!(sample["web"].memory_usage_bytes, 64 * MIB);
    let web = fx.storage.find_container(host.id, "web").await.unwrap().unwrap();
    assert!(web.metrics.is_none());
}

#[tokio::test]
async fn test_live_stats_empty_on_failure() {
    let fx = Fixture::new();
    let host = fx.add_host("edge-1", "10.0.0.5").await;
    fx.connector.set_reachable("10.0.0.5", false);

    assert!(fx.live().current_stats(host.id).await.is_empty());
    assert!(fx.live().current_stats(Uuid::new_v4()).await.is_empty());
    assert!(fx.events.is_empty().await);
}
