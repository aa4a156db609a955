// Acquirer implementation backed by an operator-supplied fetch command
// reason: tokio::process + timeout, same shape as a one-shot job execution
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use fether_core::application::constants::{DEFAULT_FETCH_TIMEOUT, NODE_BINARY_NAME};
use fether_core::port::{Acquirer, AcquisitionError};

/// Environment variable telling the fetch command where to install
pub const INSTALL_DIR_ENV: &str = "FETHER_INSTALL_DIR";

/// Runs a fetch command through the platform shell
///
/// The command gets `FETHER_INSTALL_DIR` in its environment and runs with
/// that directory as cwd. It must leave the node binary there.
pub struct CommandAcquirer {
    command: Option<String>,
    install_dir: PathBuf,
    timeout: Duration,
}

impl CommandAcquirer {
    /// # Arguments
    /// * `command` - Shell command that installs the node; None disables acquisition
    /// * `install_dir` - Directory the binary must end up in
    pub fn new(command: Option<String>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            install_dir: install_dir.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn shell(command: &str) -> Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(command);
        cmd
    }

    /// Run the command and wait, bounded by the timeout
    async fn run(&self, command: &str) -> Result<std::process::Output, AcquisitionError> {
        let child = Self::shell(command)
            .env(INSTALL_DIR_ENV, &self.install_dir)
            .current_dir(&self.install_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AcquisitionError::CommandFailed(e.to_string()))?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AcquisitionError::Io(e.to_string())),
            Err(_) => Err(AcquisitionError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl Acquirer for CommandAcquirer {
    async fn acquire(&self) -> Result<PathBuf, AcquisitionError> {
        let command = self
            .command
            .as_deref()
            .ok_or(AcquisitionError::NotConfigured)?;

        std::fs::create_dir_all(&self.install_dir)
            .map_err(|e| AcquisitionError::Io(e.to_string()))?;

        info!(
            command = %command,
            install_dir = %self.install_dir.display(),
            timeout_ms = %self.timeout.as_millis(),
            "Fetching node binary"
        );

        let output = self.run(command).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(exit_code = ?output.status.code(), "Fetch command failed");
            return Err(AcquisitionError::CommandFailed(format!(
                "exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let path = self.install_dir.join(NODE_BINARY_NAME);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if path.is_file() {
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                    .map_err(|e| AcquisitionError::Io(e.to_string()))?;
            }
        }

        info!(path = %path.display(), "Fetch command completed");
        Ok(path)
    }
}
