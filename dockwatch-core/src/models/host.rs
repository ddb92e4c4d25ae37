//! Monitored host model

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default path of the compose file on a freshly added host
pub const DEFAULT_COMPOSE_PATH: &str = "/app/docker-compose.yml";

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// A remote machine running a container runtime, reachable over SSH.
///
/// Hosts are owned by the persistence layer. Monitoring passes only ever
/// touch [`Host::is_connected`] and [`Host::last_check`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// Hostname or IP address
    pub address: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// SSH login user
    pub username: String,
    /// SSH password, used through `sshpass` when set
    #[serde(default, with = "secret_serde", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    /// Path to a private key passed with `-i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
    /// Path of the compose file that manages this host's containers
    #[serde(default = "default_compose_path")]
    pub compose_path: String,
    /// Result of the most recent connectivity probe
    #[serde(default)]
    pub is_connected: bool,
    /// When the host was last probed
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_compose_path() -> String {
    DEFAULT_COMPOSE_PATH.to_string()
}

impl Host {
    /// Creates a new, never-probed host
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            password: None,
            identity_file: None,
            compose_path: default_compose_path(),
            is_connected: false,
            last_check: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the SSH port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the SSH password
    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Sets the private key path
    #[must_use]
    pub fn with_identity_file(mut self, path: impl Into<String>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Sets the compose file path
    #[must_use]
    pub fn with_compose_path(mut self, path: impl Into<String>) -> Self {
        self.compose_path = path.into();
        self
    }

    /// Returns `user@address`, the SSH destination
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.address)
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Serde bridge for optional secrets.
///
/// `SecretString` deliberately does not implement `Serialize`; the
/// persistence layer still has to store the password, so it is exposed
/// here and nowhere else.
mod secret_serde {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(secret) => serializer.serialize_some(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}
