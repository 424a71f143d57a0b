//! SSH local-forward tunnel
//!
//! The database of each stage is only reachable through its SSH host. The tunnel runs
//! `ssh -N -L <local>:localhost:27017` as a child process, so the database adapter only
//! ever sees a `localhost:<local>` connection string. The child is killed when the
//! [`SshTunnel`] is dropped.

use mediarecon_core::constants::REMOTE_DATABASE_PORT;
use mediarecon_core::{Config, Stage};
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("SSH key {path} is not readable: {source}")]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH exited before the tunnel was ready ({0})")]
    Exited(ExitStatus),

    #[error("Local port {port} not reachable after {timeout:?}")]
    NotReady { port: u16, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TunnelError {
    /// Only an unreadable key stops startup; every other tunnel error is logged.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TunnelError::KeyUnreadable { .. })
    }
}

#[derive(Debug, Clone)]
pub struct TunnelSpec {
    pub program: String,
    pub host: String,
    pub username: String,
    pub private_key_path: PathBuf,
    pub ssh_port: u16,
    pub local_port: u16,
    pub remote_port: u16,
    pub ready_timeout: Duration,
}

impl TunnelSpec {
    pub fn from_config(config: &Config, stage: Stage) -> Self {
        Self {
            program: "ssh".to_string(),
            host: config.target(stage).host.clone(),
            username: config.ssh.username.clone(),
            private_key_path: config.ssh.private_key_path.clone(),
            ssh_port: config.ssh.port,
            local_port: config.local_port,
            remote_port: REMOTE_DATABASE_PORT,
            ready_timeout: config.ssh.ready_timeout,
        }
    }

    pub fn ssh_args(&self) -> Vec<String> {
        vec![
            "-N".to_string(),
            "-o".to_string(),
            "ExitOnForwardFailure=yes".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-L".to_string(),
            format!("{}:localhost:{}", self.local_port, self.remote_port),
            "-i".to_string(),
            self.private_key_path.display().to_string(),
            "-p".to_string(),
            self.ssh_port.to_string(),
            format!("{}@{}", self.username, self.host),
        ]
    }
}

pub struct SshTunnel {
    child: Child,
    local_port: u16,
    ready_timeout: Duration,
}

impl SshTunnel {
    /// Check the key and start the forwarding process. Does not wait for the port.
    pub async fn spawn(spec: &TunnelSpec) -> Result<Self, TunnelError> {
        tokio::fs::File::open(&spec.private_key_path)
            .await
            .map_err(|source| TunnelError::KeyUnreadable {
                path: spec.private_key_path.clone(),
                source,
            })?;

        let child = Command::new(&spec.program)
            .args(spec.ssh_args())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TunnelError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        tracing::info!(
            host = %spec.host,
            local_port = spec.local_port,
            remote_port = spec.remote_port,
            "SSH tunnel started"
        );

        Ok(Self {
            child,
            local_port: spec.local_port,
            ready_timeout: spec.ready_timeout,
        })
    }

    /// Poll the local port until it accepts connections, the child exits or the timeout
    /// elapses.
    pub async fn wait_ready(&mut self) -> Result<(), TunnelError> {
        let start = Instant::now();
        loop {
            if TcpStream::connect(("127.0.0.1", self.local_port))
                .await
                .is_ok()
            {
                tracing::info!(
                    local_port = self.local_port,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "SSH tunnel ready"
                );
                return Ok(());
            }

            if let Some(status) = self.child.try_wait()? {
                return Err(TunnelError::Exited(status));
            }

            if start.elapsed() >= self.ready_timeout {
                return Err(TunnelError::NotReady {
                    port: self.local_port,
                    timeout: self.ready_timeout,
                });
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}
