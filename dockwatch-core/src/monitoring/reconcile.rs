//! Inventory reconciliation
//!
//! One pass probes every host, records connectivity flips, and converges
//! the stored container set on what the host reports. Hosts are handled
//! one at a time and a failure on one host never stops the pass.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use super::client::DockerClient;
use crate::error::{DockwatchError, DockwatchResult};
use crate::events::EventSink;
use crate::models::{ActivityEvent, Host, ListingRow, Severity};
use crate::storage::{HostFilter, Storage};
use crate::tracing::span_names;

/// What one host's reconciliation changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    /// Host ID
    pub host_id: Uuid,
    /// Host name at the time of the pass
    pub host_name: String,
    /// Connectivity after the pass
    pub connected: bool,
    /// Names of newly detected containers
    pub added: Vec<String>,
    /// Number of existing records refreshed from the listing
    pub updated: usize,
    /// Names of records deleted because the host no longer lists them
    pub removed: Vec<String>,
    /// Failure that cut the host's pass short, if any
    pub error: Option<String>,
}

impl HostReport {
    fn new(host: &Host) -> Self {
        Self {
            host_id: host.id,
            host_name: host.name.clone(),
            connected: host.is_connected,
            added: Vec::new(),
            updated: 0,
            removed: Vec::new(),
            error: None,
        }
    }
}

/// Outcome of a fleet-wide pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// One report per host, in storage order
    pub hosts: Vec<HostReport>,
}

impl PassSummary {
    /// Number of hosts that answered the probe
    #[must_use]
    pub fn connected(&self) -> usize {
        self.hosts.iter().filter(|h| h.connected).count()
    }

    /// Number of hosts whose pass reported an error
    #[must_use]
    pub fn failed(&self) -> usize {
        self.hosts.iter().filter(|h| h.error.is_some()).count()
    }
}

/// Result of an explicit connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether the probe succeeded
    pub connected: bool,
    /// Runtime version line, or the failure
    pub detail: String,
}

/// Drives reconciliation passes
pub struct ReconciliationEngine {
    client: DockerClient,
    storage: Arc<dyn Storage>,
    events: Arc<dyn EventSink>,
}

impl ReconciliationEngine {
    /// Creates an engine over the given collaborators
    #[must_use]
    pub fn new(client: DockerClient, storage: Arc<dyn Storage>, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            storage,
            events,
        }
    }

    /// Reconciles every stored host, one after another.
    ///
    /// Never fails: per-host problems end up in the host's report, in the
    /// activity log and in the host's connectivity flag.
    pub async fn run_reconciliation_pass(&self) -> PassSummary {
        let hosts = match self.storage.list_hosts(&HostFilter::all()).await {
            Ok(hosts) => hosts,
            Err(err) => {
                tracing::error!(error = %err, "Cannot list hosts for reconciliation");
                return PassSummary::default();
            }
        };

        let span = crate::trace_operation!(span_names::RECONCILE_PASS, host_count = hosts.len());
        async {
            let mut summary = PassSummary::default();
            for host in &hosts {
                let span = crate::trace_operation!(
                    span_names::RECONCILE_HOST,
                    host_id = %host.id,
                    host = %host.name
                );
                let report = match self.reconcile_host(host).instrument(span.clone()).await {
                    Ok(report) => report,
                    Err(err) => self.mark_failed(host, &err).instrument(span).await,
                };
                summary.hosts.push(report);
            }
            tracing::info!(
                hosts = summary.hosts.len(),
                connected = summary.connected(),
                failed = summary.failed(),
                "Reconciliation pass finished"
            );
            summary
        }
        .instrument(span)
        .await
    }

    /// Reconciles one host: probe, record connectivity, converge inventory.
    ///
    /// A failed listing is reported as an error event and leaves the
    /// inventory untouched; it does not make this call fail.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage fails.
    pub async fn reconcile_host(&self, host: &Host) -> DockwatchResult<HostReport> {
        let connected = self.client.test_connection(host).await;
        let host = self.record_connectivity(host, connected, None).await?;
        let mut report = HostReport::new(&host);

        if !connected {
            return Ok(report);
        }

        match self.client.list_containers(&host).await {
            Ok(rows) => self.converge(&host, &rows, &mut report).await?,
            Err(err) => {
                tracing::warn!(error = %err, "Container listing failed");
                self.events
                    .record(
                        ActivityEvent::new(
                            Severity::Error,
                            format!("Error updating containers: {err}"),
                        )
                        .with_host(host.id),
                    )
                    .await;
                report.error = Some(err.to_string());
            }
        }
        Ok(report)
    }

    /// Probes one host on request and records the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not exist or storage fails.
    pub async fn test_host_connection(
        &self,
        host_id: Uuid,
        actor: Option<&str>,
    ) -> DockwatchResult<ProbeResult> {
        let host = self.storage.get_host(host_id).await?;
        let span = crate::trace_operation!(span_names::CONNECTION_TEST, host = %host.name);
        self.probe(host, actor).instrument(span).await
    }

    async fn probe(&self, host: Host, actor: Option<&str>) -> DockwatchResult<ProbeResult> {
        let probe = self.client.probe(&host).await;
        let connected = probe.is_ok();
        let host = self.record_connectivity(&host, connected, actor).await?;

        let detail = match probe {
            Ok(version) => {
                self.events
                    .record(
                        ActivityEvent::new(
                            Severity::Success,
                            format!("Connection to {} succeeded", host.name),
                        )
                        .with_host(host.id)
                        .with_actor(actor),
                    )
                    .await;
                version
            }
            Err(err) => err.to_string(),
        };
        Ok(ProbeResult { connected, detail })
    }

    /// Re-reads one host's listing on request and converges the inventory.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after marking the host disconnected, or an
    /// error if the host does not exist or storage fails.
    pub async fn refresh_inventory(
        &self,
        host_id: Uuid,
        actor: Option<&str>,
    ) -> DockwatchResult<HostReport> {
        let host = self.storage.get_host(host_id).await?;
        let span = crate::trace_operation!(span_names::INVENTORY_REFRESH, host = %host.name);
        self.refresh(host, actor).instrument(span).await
    }

    async fn refresh(&self, host: Host, actor: Option<&str>) -> DockwatchResult<HostReport> {
        let rows = match self.client.list_containers(&host).await {
            Ok(rows) => rows,
            Err(err) => {
                let host = self.record_connectivity(&host, false, actor).await?;
                self.events
                    .record(
                        ActivityEvent::new(
                            Severity::Error,
                            format!("Error refreshing containers: {err}"),
                        )
                        .with_host(host.id)
                        .with_actor(actor),
                    )
                    .await;
                return Err(err.into());
            }
        };

        let host = self.record_connectivity(&host, true, actor).await?;
        let mut report = HostReport::new(&host);
        self.converge(&host, &rows, &mut report).await?;
        self.events
            .record(
                ActivityEvent::new(
                    Severity::Info,
                    format!("Containers refreshed: {} found", rows.len()),
                )
                .with_host(host.id)
                .with_actor(actor),
            )
            .await;
        Ok(report)
    }

    /// Stores the probe result and emits an event if the flag flipped
    async fn record_connectivity(
        &self,
        host: &Host,
        connected: bool,
        actor: Option<&str>,
    ) -> DockwatchResult<Host> {
        let mut host = host.clone();
        let was_connected = host.is_connected;
        host.is_connected = connected;
        host.last_check = Some(Utc::now());
        self.storage.save_host(&host).await?;

        let flip = match (was_connected, connected) {
            (false, true) => Some((Severity::Success, format!("Host {} reconnected", host.name))),
            (true, false) => Some((Severity::Warning, format!("Host {} disconnected", host.name))),
            _ => None,
        };
        if let Some((severity, message)) = flip {
            tracing::info!(connected, "Host connectivity changed");
            self.events
                .record(
                    ActivityEvent::new(severity, message)
                        .with_host(host.id)
                        .with_actor(actor),
                )
                .await;
        }
        Ok(host)
    }

    /// Upserts every listed container and deletes the ones no longer listed
    async fn converge(
        &self,
        host: &Host,
        rows: &[ListingRow],
        report: &mut HostReport,
    ) -> DockwatchResult<()> {
        for row in rows {
            let (record, created) = self.storage.upsert_container(host.id, row).await?;
            if created {
                tracing::info!(container = %record.name, "New container detected");
                self.events
                    .record(
                        ActivityEvent::new(
                            Severity::Info,
                            format!("New container detected: {}", record.name),
                        )
                        .with_host(host.id)
                        .with_container(record.id),
                    )
                    .await;
                report.added.push(record.name);
            } else {
                report.updated += 1;
            }
        }

        let seen: HashSet<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        for record in self.storage.list_containers(host.id).await? {
            if seen.contains(record.name.as_str()) {
                continue;
            }
            tracing::info!(container = %record.name, "Container no longer listed");
            self.events
                .record(
                    ActivityEvent::new(
                        Severity::Warning,
                        format!("Container removed: {}", record.name),
                    )
                    .with_host(host.id),
                )
                .await;
            self.storage.delete_container(record.id).await?;
            report.removed.push(record.name);
        }
        Ok(())
    }

    /// Marks a host disconnected after an unexpected failure
    async fn mark_failed(&self, host: &Host, err: &DockwatchError) -> HostReport {
        tracing::error!(error = %err, "Reconciliation failed for host");

        let mut stored = match self.storage.get_host(host.id).await {
            Ok(stored) => stored,
            Err(_) => host.clone(),
        };
        let was_connected = stored.is_connected;
        stored.is_connected = false;
        stored.last_check = Some(Utc::now());
        if let Err(save_err) = self.storage.save_host(&stored).await {
            tracing::error!(error = %save_err, "Cannot mark host disconnected");
        } else if was_connected {
            self.events
                .record(
                    ActivityEvent::new(
                        Severity::Warning,
                        format!("Host {} disconnected", stored.name),
                    )
                    .with_host(stored.id),
                )
                .await;
        }

        let mut report = HostReport::new(&stored);
        report.error = Some(err.to_string());
        report
    }
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
