//! Application settings stored in `config.toml`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::monitoring::{RuntimeSettings, ScheduleSettings};
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// How commands are spelled on hosts
    #[serde(default)]
    pub runtime: RuntimeSettings,
    /// Cadence of the periodic driver
    #[serde(default)]
    pub schedule: ScheduleSettings,
    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `error`, `warn`, `info`, `debug` or `trace` (default: `info`)
    #[serde(default = "default_level")]
    pub level: String,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive that replaces `level`, e.g.
    /// `dockwatch_core=debug,dockwatch=warn`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
            filter: None,
        }
    }
}

impl LoggingSettings {
    /// Parsed level; unknown names fall back to `info`
    #[must_use]
    pub fn level(&self) -> TracingLevel {
        self.level.parse().unwrap_or_default()
    }

    /// Tracing setup for these settings
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let output = self
            .file
            .as_ref()
            .map_or(TracingOutput::Stderr, |path| TracingOutput::File(path.clone()));
        let config = TracingConfig::new()
            .with_level(self.level())
            .with_output(output)
            .with_profiling(false);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}
