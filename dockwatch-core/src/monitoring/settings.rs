//! Runtime and schedule settings for monitoring passes
//!
//! Stored in `config.toml` under `[runtime]` and `[schedule]`. Missing keys
//! fall back to per-field defaults; out-of-range values are clamped by the
//! `effective_*` accessors rather than rejected.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::remote::DEFAULT_CONNECT_TIMEOUT_SECS;

/// Default number of log lines fetched per container
pub const DEFAULT_LOG_TAIL_LINES: u32 = 100;

const MIN_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 3600;

/// How commands are spelled on the monitored hosts (`[runtime]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Container runtime CLI (default: `docker`)
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Compose orchestrator CLI (default: `docker-compose`)
    #[serde(default = "default_compose_binary")]
    pub compose_binary: String,
    /// SSH connect timeout in seconds (1–120, default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Lines fetched by the logs command (default: 100)
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: u32,
}

fn default_binary() -> String {
    "docker".to_string()
}

fn default_compose_binary() -> String {
    "docker-compose".to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_log_tail_lines() -> u32 {
    DEFAULT_LOG_TAIL_LINES
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            compose_binary: default_compose_binary(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

impl RuntimeSettings {
    /// Returns the connect timeout clamped to 1–120 seconds
    #[must_use]
    pub const fn effective_connect_timeout(&self) -> Duration {
        let secs = if self.connect_timeout_secs == 0 {
            1
        } else if self.connect_timeout_secs > 120 {
            120
        } else {
            self.connect_timeout_secs
        };
        Duration::from_secs(secs)
    }

    /// Returns the log tail, never zero
    #[must_use]
    pub const fn effective_log_tail_lines(&self) -> u32 {
        if self.log_tail_lines == 0 {
            DEFAULT_LOG_TAIL_LINES
        } else {
            self.log_tail_lines
        }
    }
}

/// Cadence of the periodic driver (`[schedule]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Seconds between reconciliation passes (default: 60)
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
    /// Seconds between stats passes (default: 30)
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    /// Seconds between live stats samples (default: 5)
    #[serde(default = "default_live_interval_secs")]
    pub live_interval_secs: u64,
}

const fn default_reconcile_interval_secs() -> u64 {
    60
}

const fn default_stats_interval_secs() -> u64 {
    30
}

const fn default_live_interval_secs() -> u64 {
    5
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval_secs(),
            stats_interval_secs: default_stats_interval_secs(),
            live_interval_secs: default_live_interval_secs(),
        }
    }
}

const fn clamp_interval(secs: u64) -> Duration {
    let secs = if secs < MIN_INTERVAL_SECS {
        MIN_INTERVAL_SECS
    } else if secs > MAX_INTERVAL_SECS {
        MAX_INTERVAL_SECS
    } else {
        secs
    };
    Duration::from_secs(secs)
}

impl ScheduleSettings {
    /// Reconciliation interval clamped to 1–3600 seconds
    #[must_use]
    pub const fn effective_reconcile_interval(&self) -> Duration {
        clamp_interval(self.reconcile_interval_secs)
    }

    /// Stats interval clamped to 1–3600 seconds
    #[must_use]
    pub const fn effective_stats_interval(&self) -> Duration {
        clamp_interval(self.stats_interval_secs)
    }

    /// Live stats interval clamped to 1–3600 seconds
    #[must_use]
    pub const fn effective_live_interval(&self) -> Duration {
        clamp_interval(self.live_interval_secs)
    }
}
