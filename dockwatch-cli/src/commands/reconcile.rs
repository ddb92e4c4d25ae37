//! Reconcile command.

use std::path::Path;

use dockwatch_core::HostReport;

use crate::error::CliError;
use crate::util::{Context, actor, create_runtime};

/// Reconcile command handler
///
/// Without `--host` this runs one full pass over every host. With it, the
/// single host is refreshed on behalf of the current user.
pub fn cmd_reconcile(config_path: Option<&Path>, host: Option<&str>) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let runtime = create_runtime()?;
    let engine = ctx.engine();

    if let Some(host) = host {
        let host = runtime.block_on(ctx.host(host))?;
        let actor = actor();
        let report = runtime.block_on(engine.refresh_inventory(host.id, Some(&actor)))?;
        print_report(&report);
        return Ok(());
    }

    let summary = runtime.block_on(engine.run_reconciliation_pass());
    if summary.hosts.is_empty() {
        println!("No hosts found.");
        return Ok(());
    }
    for report in &summary.hosts {
        print_report(report);
    }
    println!(
        "Reconciled {} host(s): {} connected, {} failed",
        summary.hosts.len(),
        summary.connected(),
        summary.failed()
    );
    Ok(())
}

fn print_report(report: &HostReport) {
    if let Some(error) = &report.error {
        println!("{}: {error}", report.host_name);
        return;
    }
    println!(
        "{}: {} added, {} updated, {} removed",
        report.host_name,
        report.added.len(),
        report.updated,
        report.removed.len()
    );
    for name in &report.added {
        println!("  + {name}");
    }
    for name in &report.removed {
        println!("  - {name}");
    }
}
