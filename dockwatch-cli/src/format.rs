//! Output formatting helpers shared by the list commands.

use dockwatch_core::Severity;

/// Quotes a CSV field when it contains a delimiter, quote or newline
#[must_use]
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders a byte count with a binary suffix, e.g. `1.5GiB`
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

/// ANSI escape sequences, empty when color is disabled
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub green: &'static str,
    pub red: &'static str,
    pub yellow: &'static str,
    pub cyan: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Colors {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                green: "\x1b[32m",
                red: "\x1b[31m",
                yellow: "\x1b[33m",
                cyan: "\x1b[36m",
                bold: "\x1b[1m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                green: "",
                red: "",
                yellow: "",
                cyan: "",
                bold: "",
                reset: "",
            }
        }
    }

    /// Color for an event severity
    #[must_use]
    pub const fn severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Info => self.cyan,
            Severity::Success => self.green,
            Severity::Warning => self.yellow,
            Severity::Error => self.red,
        }
    }
}
