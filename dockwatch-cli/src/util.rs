//! Shared utility functions used across command modules.

use std::path::Path;
use std::sync::Arc;

use dockwatch_core::{
    ActionExecutor, ActionService, AppSettings, ConfigManager, ContainerRecord, DockerClient,
    FileStorage, Host, HostFilter, JsonlEventSink, LiveStats, OpenSshConnector,
    ReconciliationEngine, StatsUpdater, Storage,
};

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Creates the async runtime for a single command
pub fn create_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create async runtime: {e}")))
}

/// Name recorded as the actor of manual operations
pub fn actor() -> String {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| "cli".to_string())
}

/// Everything a command needs: settings, inventory, activity log and the
/// SSH-backed runtime client
pub struct Context {
    pub settings: AppSettings,
    pub storage: Arc<FileStorage>,
    pub events: Arc<JsonlEventSink>,
    pub client: DockerClient,
}

impl Context {
    /// Loads settings and opens the inventory under the config directory
    pub fn load(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = create_config_manager(config_path)?;
        let settings = config
            .load_settings()
            .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
        let client = DockerClient::new(
            Arc::new(OpenSshConnector::new()),
            settings.runtime.clone(),
        );
        Ok(Self {
            storage: Arc::new(FileStorage::new(config.inventory_path())),
            events: Arc::new(JsonlEventSink::new(config.events_path())),
            settings,
            client,
        })
    }

    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.client.clone(), self.storage.clone(), self.events.clone())
    }

    pub fn stats(&self) -> StatsUpdater {
        StatsUpdater::new(self.client.clone(), self.storage.clone())
    }

    pub fn live(&self) -> LiveStats {
        LiveStats::new(self.client.clone(), self.storage.clone())
    }

    pub fn actions(&self) -> ActionService {
        ActionService::new(
            ActionExecutor::new(self.client.clone()),
            self.storage.clone(),
            self.events.clone(),
        )
    }

    /// Every stored host
    pub async fn hosts(&self) -> Result<Vec<Host>, CliError> {
        Ok(self.storage.list_hosts(&HostFilter::all()).await?)
    }

    /// Resolves a host by name or ID
    pub async fn host(&self, name_or_id: &str) -> Result<Host, CliError> {
        let hosts = self.hosts().await?;
        find_host(&hosts, name_or_id).cloned()
    }

    /// Resolves a container by name, optionally narrowed to one host.
    ///
    /// A name present on several hosts needs the host to disambiguate.
    pub async fn container(
        &self,
        name: &str,
        host: Option<&str>,
    ) -> Result<(Host, ContainerRecord), CliError> {
        let hosts = match host {
            Some(host) => vec![self.host(host).await?],
            None => self.hosts().await?,
        };

        let mut matches = Vec::new();
        for host in hosts {
            if let Some(record) = self.storage.find_container(host.id, name).await? {
                matches.push((host, record));
            }
        }

        match matches.len() {
            0 => Err(CliError::ContainerNotFound(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => {
                let names: Vec<_> = matches.iter().map(|(h, _)| h.name.as_str()).collect();
                Err(CliError::Config(format!(
                    "Container '{}' exists on several hosts: {}. Use --host",
                    name,
                    names.join(", ")
                )))
            }
        }
    }
}

/// Find a host by name or UUID
pub fn find_host<'a>(hosts: &'a [Host], name_or_id: &str) -> Result<&'a Host, CliError> {
    // First try to find by exact name match
    if let Some(host) = hosts.iter().find(|h| h.name == name_or_id) {
        return Ok(host);
    }

    // Try to find by UUID
    if let Ok(uuid) = uuid::Uuid::parse_str(name_or_id)
        && let Some(host) = hosts.iter().find(|h| h.id == uuid)
    {
        return Ok(host);
    }

    // Try case-insensitive name match
    if let Some(host) = hosts.iter().find(|h| h.name.eq_ignore_ascii_case(name_or_id)) {
        return Ok(host);
    }

    // Try partial name match (prefix)
    let matches: Vec<_> = hosts
        .iter()
        .filter(|h| h.name.to_lowercase().starts_with(&name_or_id.to_lowercase()))
        .collect();

    match matches.len() {
        0 => Err(CliError::HostNotFound(name_or_id.to_string())),
        1 => Ok(matches[0]),
        _ => {
            let names: Vec<_> = matches.iter().map(|h| h.name.as_str()).collect();
            Err(CliError::Config(format!(
                "Ambiguous host name '{}'. Matches: {}",
                name_or_id,
                names.join(", ")
            )))
        }
    }
}
