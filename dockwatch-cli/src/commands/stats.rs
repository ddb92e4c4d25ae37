//! Stats command.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use dockwatch_core::{ContainerMetrics, LiveStats};
use uuid::Uuid;

use crate::error::CliError;
use crate::format::format_bytes;
use crate::util::{Context, create_runtime};

/// Stats command handler
///
/// Refreshes stored metrics once, or with `--watch` streams live samples
/// of one host without storing them until Ctrl+C.
pub fn cmd_stats(config_path: Option<&Path>, host: Option<&str>, watch: bool) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;

    match (host, watch) {
        (Some(host), true) => {
            let host = runtime.block_on(ctx.host(host))?;
            let interval = ctx.settings.schedule.effective_live_interval();
            eprintln!(
                "Streaming stats for {} every {}s (Ctrl+C to stop)",
                host.name,
                interval.as_secs()
            );
            runtime.block_on(stream(ctx.live(), host.id, interval))
        }
        (Some(host), false) => {
            let host = runtime.block_on(ctx.host(host))?;
            let sample = runtime.block_on(ctx.stats().refresh_host(host.id))?;
            println!("{}", format_sample(&sample));
            Ok(())
        }
        (None, _) => {
            let reports = runtime.block_on(ctx.stats().run_stats_pass());
            if reports.is_empty() {
                println!("No connected hosts.");
                return Ok(());
            }
            for report in &reports {
                match &report.error {
                    Some(error) => println!("{}: {error}", report.host_name),
                    None => println!(
                        "{}: {} updated, {} skipped",
                        report.host_name, report.updated, report.skipped
                    ),
                }
            }
            Ok(())
        }
    }
}

async fn stream(
    live: LiveStats,
    host_id: Uuid,
    interval: std::time::Duration,
) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = ticker.tick() => {
                let sample = live.current_stats(host_id).await;
                println!("{}", chrono::Local::now().format("%H:%M:%S"));
                println!("{}", format_sample(&sample));
                println!();
            }
        }
    }
}

/// Format one sample as a table string
#[must_use]
pub fn format_sample(sample: &BTreeMap<String, ContainerMetrics>) -> String {
    if sample.is_empty() {
        return "No running containers.".to_string();
    }

    let mut output = String::new();
    let name_width = sample.keys().map(String::len).max().unwrap_or(4).max(4);

    let _ = writeln!(
        output,
        "{:<name_width$}  {:>7}  {:>21}  {:>6}  NET I/O",
        "NAME", "CPU", "MEMORY", "MEM%"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<7}  {:-<21}  {:-<6}  {:-<7}",
        "", "", "", "", ""
    );

    for (name, metrics) in sample {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:>6.1}%  {:>21}  {:>5.1}%  {} / {}",
            name,
            metrics.cpu_percent,
            format!(
                "{} / {}",
                format_bytes(metrics.memory_usage_bytes),
                format_bytes(metrics.memory_limit_bytes)
            ),
            metrics.memory_percent(),
            format_bytes(metrics.network_rx_bytes),
            format_bytes(metrics.network_tx_bytes)
        );
    }

    output.trim_end().to_string()
}
