//! Resource usage refresh
//!
//! Stats passes only ever touch metric fields. They never change a
//! container's status or a host's connectivity and never emit activity
//! events; failures are logged and the pass moves on.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::client::DockerClient;
use crate::error::{DockwatchResult, StorageError};
use crate::models::{ContainerMetrics, Host};
use crate::storage::{HostFilter, Storage};
use crate::tracing::span_names;

/// What one host's stats refresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Host ID
    pub host_id: Uuid,
    /// Host name at the time of the pass
    pub host_name: String,
    /// Records whose metrics were written
    pub updated: usize,
    /// Sampled containers with no stored record
    pub skipped: usize,
    /// Why the host was skipped, if it was
    pub error: Option<String>,
}

/// Applies stats samples to stored container records
pub struct StatsUpdater {
    client: DockerClient,
    storage: Arc<dyn Storage>,
}

impl StatsUpdater {
    /// Creates an updater over the given collaborators
    #[must_use]
    pub fn new(client: DockerClient, storage: Arc<dyn Storage>) -> Self {
        Self { client, storage }
    }

    /// Refreshes metrics on every connected host, one after another
    pub async fn run_stats_pass(&self) -> Vec<StatsReport> {
        let hosts = match self.storage.list_hosts(&HostFilter::connected()).await {
            Ok(hosts) => hosts,
            Err(err) => {
                tracing::error!(error = %err, "Cannot list hosts for stats pass");
                return Vec::new();
            }
        };

        let span = crate::trace_operation!(span_names::STATS_PASS, host_count = hosts.len());
        async {
            let mut reports = Vec::with_capacity(hosts.len());
            for host in &hosts {
                let span = crate::trace_operation_debug!(
                    span_names::STATS_HOST,
                    host_id = %host.id,
                    host = %host.name
                );
                let mut report = StatsReport {
                    host_id: host.id,
                    host_name: host.name.clone(),
                    updated: 0,
                    skipped: 0,
                    error: None,
                };
                match self.refresh(host).instrument(span).await {
                    Ok((_, updated, skipped)) => {
                        report.updated = updated;
                        report.skipped = skipped;
                    }
                    Err(err) => {
                        tracing::warn!(host = %host.name, error = %err, "Stats refresh failed");
                        report.error = Some(err.to_string());
                    }
                }
                reports.push(report);
            }
            reports
        }
        .instrument(span)
        .await
    }

    /// Refreshes one host on request and returns the sample
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not exist, the stats fetch fails
    /// or storage fails.
    pub async fn refresh_host(
        &self,
        host_id: Uuid,
    ) -> DockwatchResult<BTreeMap<String, ContainerMetrics>> {
        let host = self.storage.get_host(host_id).await?;
        let span = crate::trace_operation!(span_names::STATS_HOST, host = %host.name);
        let (sample, _, _) = self.refresh(&host).instrument(span).await?;
        Ok(sample)
    }

    async fn refresh(
        &self,
        host: &Host,
    ) -> DockwatchResult<(BTreeMap<String, ContainerMetrics>, usize, usize)> {
        let sample = self.client.container_stats(host).await?;
        let mut updated = 0;
        let mut skipped = 0;

        for (name, metrics) in &sample {
            let Some(record) = self.storage.find_container(host.id, name).await? else {
                skipped += 1;
                continue;
            };
            match self.storage.update_metrics(record.id, *metrics).await {
                Ok(()) => updated += 1,
                // Removed by a concurrent reconciliation pass
                Err(StorageError::ContainerNotFound(_)) => skipped += 1,
                Err(err) => return Err(err.into()),
            }
        }

        tracing::debug!(updated, skipped, "Container metrics refreshed");
        Ok((sample, updated, skipped))
    }
}

impl std::fmt::Debug for StatsUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsUpdater")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

/// Live stats accessor for push consumers
///
/// Samples the host on every call and stores nothing.
pub struct LiveStats {
    client: DockerClient,
    storage: Arc<dyn Storage>,
}

impl LiveStats {
    /// Creates the accessor
    #[must_use]
    pub fn new(client: DockerClient, storage: Arc<dyn Storage>) -> Self {
        Self { client, storage }
    }

    /// Current `name -> metrics` for one host; empty on any failure
    pub async fn current_stats(&self, host_id: Uuid) -> BTreeMap<String, ContainerMetrics> {
        let span = crate::trace_operation_debug!(span_names::LIVE_STATS, host_id = %host_id);
        async {
            let host = match self.storage.get_host(host_id).await {
                Ok(host) => host,
                Err(err) => {
                    tracing::debug!(error = %err, "Live stats for unknown host");
                    return BTreeMap::new();
                }
            };
            match self.client.container_stats(&host).await {
                Ok(sample) => sample,
                Err(err) => {
                    tracing::debug!(host = %host.name, error = %err, "Live stats unavailable");
                    BTreeMap::new()
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for LiveStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveStats")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
