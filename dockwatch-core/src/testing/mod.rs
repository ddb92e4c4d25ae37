//! Scripted transport for exercising monitoring passes without live hosts.
//!
//! [`ScriptedConnector`] answers commands from a per-host table and
//! records every command it was asked to run, so passes, actions and the
//! CLI can be driven deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::models::Host;
use crate::remote::{Channel, Connector, ExecOutput};

/// Exit status returned for commands that have no scripted response
pub const UNSCRIPTED_EXIT_CODE: i32 = 127;

#[derive(Debug)]
struct HostScript {
    reachable: bool,
    responses: HashMap<String, ExecOutput>,
    log: Vec<String>,
    connects: usize,
    closes: usize,
}

impl Default for HostScript {
    fn default() -> Self {
        Self {
            reachable: true,
            responses: HashMap::new(),
            log: Vec::new(),
            connects: 0,
            closes: 0,
        }
    }
}

type Scripts = Arc<Mutex<HashMap<String, HostScript>>>;

fn lock(scripts: &Scripts) -> MutexGuard<'_, HashMap<String, HostScript>> {
    // A panicking test must not poison every later assertion.
    scripts
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A [`Connector`] driven by canned responses, keyed by host address
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    scripts: Scripts,
}

impl ScriptedConnector {
    /// Creates a connector where every host is reachable and every
    /// command is unscripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes connection attempts to `address` succeed or fail
    pub fn set_reachable(&self, address: &str, reachable: bool) {
        lock(&self.scripts)
            .entry(address.to_string())
            .or_default()
            .reachable = reachable;
    }

    /// Scripts a successful command with the given stdout
    pub fn respond(&self, address: &str, command: &str, stdout: &str) {
        self.script(
            address,
            command,
            ExecOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    /// Scripts a failing command
    pub fn fail(&self, address: &str, command: &str, exit_code: i32, stderr: &str) {
        self.script(
            address,
            command,
            ExecOutput {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
    }

    /// Scripts an arbitrary response, replacing any earlier one
    pub fn script(&self, address: &str, command: &str, output: ExecOutput) {
        lock(&self.scripts)
            .entry(address.to_string())
            .or_default()
            .responses
            .insert(command.to_string(), output);
    }

    /// Every command run against `address`, oldest first
    #[must_use]
    pub fn commands(&self, address: &str) -> Vec<String> {
        lock(&self.scripts)
            .get(address)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    /// Number of successful connections to `address`
    #[must_use]
    pub fn connect_count(&self, address: &str) -> usize {
        lock(&self.scripts).get(address).map_or(0, |s| s.connects)
    }

    /// Number of closed connections to `address`
    #[must_use]
    pub fn close_count(&self, address: &str) -> usize {
        lock(&self.scripts).get(address).map_or(0, |s| s.closes)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        host: &Host,
        timeout: Duration,
    ) -> Result<Box<dyn Channel>, ConnectError> {
        let mut scripts = lock(&self.scripts);
        let script = scripts.entry(host.address.clone()).or_default();
        if !script.reachable {
            return Err(ConnectError::Timeout {
                destination: host.destination(),
                secs: timeout.as_secs(),
            });
        }
        script.connects += 1;
        Ok(Box::new(ScriptedChannel {
            address: host.address.clone(),
            scripts: Arc::clone(&self.scripts),
            open: true,
        }))
    }
}

struct ScriptedChannel {
    address: String,
    scripts: Scripts,
    open: bool,
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn exec(&mut self, command: &str) -> std::io::Result<ExecOutput> {
        if !self.open {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "channel closed",
            ));
        }
        let mut scripts = lock(&self.scripts);
        let script = scripts.entry(self.address.clone()).or_default();
        script.log.push(command.to_string());
        Ok(script
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| ExecOutput {
                exit_code: UNSCRIPTED_EXIT_CODE,
                stdout: String::new(),
                stderr: format!("no scripted response for `{command}`"),
            }))
    }

    async fn close(&mut self) {
        if self.open {
            self.open = false;
            lock(&self.scripts)
                .entry(self.address.clone())
                .or_default()
                .closes += 1;
        }
    }
}
