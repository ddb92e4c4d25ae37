//! Periodic monitoring loop.

use std::path::Path;
use std::time::Duration;

use dockwatch_core::{ReconciliationEngine, StatsUpdater};
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;

use crate::error::CliError;
use crate::util::{Context, create_runtime};

/// Watch command handler
///
/// Runs reconciliation and stats passes on their own intervals until
/// Ctrl+C. A pass that overruns its interval delays the next tick instead
/// of stacking passes.
pub fn cmd_watch(config_path: Option<&Path>) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;

    let reconcile_every = ctx.settings.schedule.effective_reconcile_interval();
    let stats_every = ctx.settings.schedule.effective_stats_interval();
    eprintln!(
        "Watching: reconciliation every {}s, stats every {}s (Ctrl+C to stop)",
        reconcile_every.as_secs(),
        stats_every.as_secs()
    );

    runtime.block_on(run(ctx.engine(), ctx.stats(), reconcile_every, stats_every))
}

async fn run(
    engine: ReconciliationEngine,
    stats: StatsUpdater,
    reconcile_every: Duration,
    stats_every: Duration,
) -> Result<(), CliError> {
    let (stop_tx, stop_rx) = watch::channel(false);

    let reconcile = tokio::spawn(reconcile_loop(engine, reconcile_every, stop_rx.clone()));
    let stats = tokio::spawn(stats_loop(stats, stats_every, stop_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Stopping monitoring loop");
    let _ = stop_tx.send(true);

    // Passes in flight finish before the tasks observe the stop signal
    let reconciled = reconcile.await;
    let sampled = stats.await;
    check_joined("reconciliation", reconciled)?;
    check_joined("stats", sampled)
}

fn check_joined(task: &str, result: Result<(), JoinError>) -> Result<(), CliError> {
    result.map_err(|err| {
        tracing::error!(task, error = %err, "Monitoring task failed");
        CliError::Task(err)
    })
}

async fn reconcile_loop(
    engine: ReconciliationEngine,
    every: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {
                engine.run_reconciliation_pass().await;
            }
        }
    }
}

async fn stats_loop(stats: StatsUpdater, every: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {
                let reports = stats.run_stats_pass().await;
                let updated: usize = reports.iter().map(|r| r.updated).sum();
                tracing::info!(hosts = reports.len(), updated, "Stats pass finished");
            }
        }
    }
}
