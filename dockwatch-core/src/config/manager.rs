//! Locates and reads the configuration directory

use std::path::{Path, PathBuf};

use super::settings::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "DOCKWATCH_CONFIG_DIR";

const SETTINGS_FILE: &str = "config.toml";
const INVENTORY_FILE: &str = "inventory.json";
const EVENTS_FILE: &str = "events.jsonl";

/// Owns the paths under the configuration directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses `$DOCKWATCH_CONFIG_DIR`, or `dockwatch` under the platform
    /// configuration directory
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if neither is available.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join("dockwatch")))
    }

    /// Uses an explicit directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// `config.toml`
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Host and container inventory document
    #[must_use]
    pub fn inventory_path(&self) -> PathBuf {
        self.config_dir.join(INVENTORY_FILE)
    }

    /// Activity log
    #[must_use]
    pub fn events_path(&self) -> PathBuf {
        self.config_dir.join(EVENTS_FILE)
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_LOAD).entered();
        let path = self.settings_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(AppSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_SAVE).entered();
        let content =
            toml::to_string(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::write(self.settings_path(), content)?;
        Ok(())
    }
}
