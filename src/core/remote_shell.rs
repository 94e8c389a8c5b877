use crate::errors::AppError;
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Outcome of one remote invocation. `code` is `None` when the transport was
/// killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStatus {
    pub code: Option<i32>,
}

impl RemoteStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

#[async_trait]
pub trait RemoteShell {
    /// Streams `script` into a shell on `user@host` and waits for it to exit.
    async fn run_script(&self, user: &str, host: &str, script: &[u8]) -> Result<RemoteStatus, AppError>;
}

/// Runs scripts through the `ssh` client: `ssh -q user@host <shell>` with the
/// script on stdin. Remote output is inherited by this process.
#[derive(Debug, Clone)]
pub struct SshShell {
    pub ssh_program: String,
    pub remote_shell: String,
}

impl SshShell {
    pub fn new(ssh_program: &str, remote_shell: &str) -> Self {
        SshShell {
            ssh_program: ssh_program.to_string(),
            remote_shell: remote_shell.to_string(),
        }
    }

    fn build_command(&self, user: &str, host: &str) -> Command {
        let mut command = Command::new(&self.ssh_program);
        command
            .arg("-q")
            .arg(format!("{}@{}", user, host))
            .arg(&self.remote_shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run_script(&self, user: &str, host: &str, script: &[u8]) -> Result<RemoteStatus, AppError> {
        debug!("🔌 {} -q {}@{} {}", self.ssh_program, user, host, self.remote_shell);
        let mut child = self.build_command(user, host).spawn().map_err(|e| AppError::Remote {
            host: host.to_string(),
            status: format!("failed to spawn '{}': {}", self.ssh_program, e),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A remote shell that exits early closes the pipe; its exit status
            // is what gets reported, not the broken pipe.
            if let Err(e) = stdin.write_all(script).await {
                debug!("Writing script to {} stopped early: {}", host, e);
            }
            drop(stdin);
        }

        let status = child.wait().await.map_err(|e| AppError::Remote {
            host: host.to_string(),
            status: format!("failed to wait for '{}': {}", self.ssh_program, e),
        })?;
        Ok(RemoteStatus { code: status.code() })
    }
}
