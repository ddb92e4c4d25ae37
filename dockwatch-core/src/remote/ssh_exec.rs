//! SSH transport backed by the system OpenSSH client
//!
//! [`OpenSshConnector::connect`] starts a background control master
//! (`ssh -M -N -f`) on a private socket; every command then runs as a
//! short-lived `ssh` process multiplexed over that socket, and `close`
//! asks the master to exit. Password authentication goes through
//! `sshpass -e` when it is installed.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::process::Command;
use uuid::Uuid;

use super::{Channel, Connector, ExecOutput};
use crate::error::ConnectError;
use crate::models::{DEFAULT_SSH_PORT, Host};

/// Default upper bound for a single remote command (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Idle lifetime of an orphaned control master (seconds)
const CONTROL_PERSIST_SECS: u64 = 60;

/// Opens SSH connections with the `ssh` binary
#[derive(Debug, Clone)]
pub struct OpenSshConnector {
    sshpass_available: bool,
    command_timeout: Duration,
}

impl OpenSshConnector {
    /// Creates a connector, probing once for `sshpass`
    #[must_use]
    pub fn new() -> Self {
        let sshpass_available = std::process::Command::new("sshpass")
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();

        Self {
            sshpass_available,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    /// Builds the command that starts the control master
    fn master_command(
        &self,
        host: &Host,
        control_path: &str,
        log_path: &str,
        timeout: Duration,
    ) -> Command {
        let mut cmd;

        if let Some(password) = host.password.as_ref().filter(|_| self.sshpass_available) {
            cmd = Command::new("sshpass");
            cmd.arg("-e").arg("ssh");
            cmd.env("SSHPASS", password.expose_secret());
        } else {
            cmd = Command::new("ssh");
            cmd.arg("-o").arg("BatchMode=yes");
        }

        cmd.arg("-o").arg("StrictHostKeyChecking=no");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", timeout.as_secs().max(1)));
        cmd.arg("-o").arg("ControlMaster=yes");
        cmd.arg("-o").arg(format!("ControlPath={control_path}"));
        cmd.arg("-o")
            .arg(format!("ControlPersist={CONTROL_PERSIST_SECS}"));
        // Diagnostics go to a file: the backgrounded master would keep a
        // piped stderr open forever.
        cmd.arg("-E").arg(log_path);
        Self::common_args(&mut cmd, host);
        cmd.arg("-f").arg("-N");
        cmd.arg(host.destination());

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);
        cmd
    }

    fn common_args(cmd: &mut Command, host: &Host) {
        if host.port != DEFAULT_SSH_PORT {
            cmd.arg("-p").arg(host.port.to_string());
        }
        if let Some(ref key) = host.identity_file {
            cmd.arg("-i").arg(shellexpand::tilde(key).into_owned());
        }
    }
}

impl Default for OpenSshConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for OpenSshConnector {
    async fn connect(
        &self,
        host: &Host,
        timeout: Duration,
    ) -> Result<Box<dyn Channel>, ConnectError> {
        let destination = host.destination();
        let stem = std::env::temp_dir().join(format!("dockwatch-{}", Uuid::new_v4().simple()));
        let control_path = stem.with_extension("sock");
        let log_path = stem.with_extension("log");
        let control = control_path.to_string_lossy().into_owned();
        let log = log_path.to_string_lossy().into_owned();

        let mut cmd = self.master_command(host, &control, &log, timeout);

        // ConnectTimeout only covers the TCP phase; bound auth as well.
        let bound = timeout + Duration::from_secs(2);
        let status = match tokio::time::timeout(bound, cmd.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                let _ = tokio::fs::remove_file(&log_path).await;
                return Err(ConnectError::Spawn(e.to_string()));
            }
            Err(_) => {
                let _ = tokio::fs::remove_file(&log_path).await;
                return Err(ConnectError::Timeout {
                    destination,
                    secs: timeout.as_secs(),
                });
            }
        };

        if !status.success() {
            let reason = tokio::fs::read_to_string(&log_path)
                .await
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("ssh exited with {status}"));
            let _ = tokio::fs::remove_file(&log_path).await;
            return Err(ConnectError::Handshake { destination, reason });
        }

        Ok(Box::new(OpenSshChannel {
            host: host.clone(),
            control_path,
            log_path,
            command_timeout: self.command_timeout,
            open: true,
        }))
    }
}

/// Commands multiplexed over a running control master
struct OpenSshChannel {
    host: Host,
    control_path: PathBuf,
    log_path: PathBuf,
    command_timeout: Duration,
    open: bool,
}

impl OpenSshChannel {
    fn client_command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg("-o").arg("ControlMaster=no");
        cmd.arg("-o")
            .arg(format!("ControlPath={}", self.control_path.display()));
        OpenSshConnector::common_args(&mut cmd, &self.host);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Channel for OpenSshChannel {
    async fn exec(&mut self, command: &str) -> std::io::Result<ExecOutput> {
        let mut cmd = self.client_command();
        cmd.arg(self.host.destination());
        cmd.arg(command);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = tokio::time::timeout(self.command_timeout, cmd.output())
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!(
                        "Remote command timed out after {}s",
                        self.command_timeout.as_secs()
                    ),
                )
            })??;

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;

        let mut cmd = self.client_command();
        cmd.arg("-O").arg("exit");
        cmd.arg(self.host.destination());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        if let Err(e) = tokio::time::timeout(Duration::from_secs(5), cmd.status()).await {
            tracing::debug!(
                error = %e,
                host = %self.host.address,
                "Control master did not exit in time"
            );
        }
        let _ = tokio::fs::remove_file(&self.log_path).await;
    }
}
