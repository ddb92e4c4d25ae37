//! Parser for container runtime output
//!
//! The runtime is asked for pipe-delimited tables (see [`listing_command`]
//! and [`stats_command`]). The first line of each table is a header and is
//! discarded. Malformed rows are skipped, malformed values become zero;
//! nothing in here returns an error.

use std::collections::BTreeMap;

use super::units::{parse_percentage, parse_size_pair};
use crate::models::{ContainerMetrics, ContainerStatus, ListingRow};

/// Column delimiter used in every `--format` template
pub const DELIMITER: char = '|';

/// `--format` template for the container listing
pub const LISTING_FORMAT: &str =
    "table {{.Names}}|{{.Status}}|{{.Image}}|{{.Ports}}|{{.ID}}|{{.CreatedAt}}";

/// `--format` template for the one-shot stats table
pub const STATS_FORMAT: &str =
    "table {{.Name}}|{{.CPUPerc}}|{{.MemUsage}}|{{.NetIO}}|{{.BlockIO}}";

const LISTING_FIELDS: usize = 6;
const STATS_FIELDS: usize = 5;

/// Builds the version probe, e.g. `docker --version`
#[must_use]
pub fn version_command(runtime: &str) -> String {
    format!("{runtime} --version")
}

/// Builds the untruncated listing of all containers
#[must_use]
pub fn listing_command(runtime: &str) -> String {
    format!("{runtime} ps -a --format '{LISTING_FORMAT}' --no-trunc")
}

/// Builds the single-sample stats command
#[must_use]
pub fn stats_command(runtime: &str) -> String {
    format!("{runtime} stats --no-stream --format '{STATS_FORMAT}'")
}

/// Builds the tailed logs command: compose first, runtime as fallback.
///
/// `compose_dir` must already be shell-quoted and `name` validated.
#[must_use]
pub fn logs_command(
    runtime: &str,
    compose: &str,
    compose_dir: &str,
    name: &str,
    lines: u32,
) -> String {
    format!(
        "cd {compose_dir} && {compose} logs --tail={lines} {name} 2>/dev/null \
         || {runtime} logs --tail={lines} {name}"
    )
}

/// Maps runtime status text like `Up 2 hours` onto a [`ContainerStatus`].
///
/// `Up…` is running, `Exited…` is exited, anything mentioning `Paused`
/// is paused, everything else is unknown.
#[must_use]
pub fn normalize_status(text: &str) -> ContainerStatus {
    if text.starts_with("Up") {
        ContainerStatus::Running
    } else if text.starts_with("Exited") {
        ContainerStatus::Exited
    } else if text.contains("Paused") {
        ContainerStatus::Paused
    } else {
        ContainerStatus::Unknown
    }
}

/// Stateless parser for runtime tables
pub struct OutputParser;

impl OutputParser {
    /// Parses the output of [`listing_command`].
    ///
    /// Rows without a delimiter or with fewer than six fields are skipped.
    #[must_use]
    pub fn parse_listing(output: &str) -> Vec<ListingRow> {
        Self::rows(output, LISTING_FIELDS)
            .map(|parts| ListingRow {
                name: parts[0].to_string(),
                status: normalize_status(parts[1]),
                image: parts[2].to_string(),
                ports: parts[3].to_string(),
                remote_id: parts[4].to_string(),
                created_at: parts[5].to_string(),
            })
            .collect()
    }

    /// Parses the output of [`stats_command`] into `name -> metrics`.
    ///
    /// Rows with fewer than five fields are skipped. Block I/O is read
    /// but not kept.
    #[must_use]
    pub fn parse_stats(output: &str) -> BTreeMap<String, ContainerMetrics> {
        Self::rows(output, STATS_FIELDS)
            .map(|parts| {
                let (memory_usage_bytes, memory_limit_bytes) = parse_size_pair(parts[2]);
                let (network_rx_bytes, network_tx_bytes) = parse_size_pair(parts[3]);
                (
                    parts[0].to_string(),
                    ContainerMetrics {
                        cpu_percent: parse_percentage(parts[1]),
                        memory_usage_bytes,
                        memory_limit_bytes,
                        network_rx_bytes,
                        network_tx_bytes,
                    },
                )
            })
            .collect()
    }

    /// Yields the trimmed fields of every data row with at least `min_fields`
    fn rows(output: &str, min_fields: usize) -> impl Iterator<Item = Vec<&str>> {
        output
            .trim()
            .lines()
            .skip(1)
            .filter(|line| line.contains(DELIMITER))
            .map(|line| line.split(DELIMITER).map(str::trim).collect::<Vec<_>>())
            .filter(move |parts| parts.len() >= min_fields)
    }
}
