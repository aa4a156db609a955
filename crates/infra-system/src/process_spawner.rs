// Process spawner implementation
// reason: tokio::process for async child management, nix for SIGTERM delivery
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use fether_core::application::constants::{
    GRACEFUL_SHUTDOWN_TIMEOUT, MAX_LINE_BYTES, PIPE_DRAIN_TIMEOUT,
};
use fether_core::domain::ExitStatusInfo;
use fether_core::port::{
    OutputStream, ProcessControl, ProcessEvent, ProcessSpawner, SpawnError, SpawnedProcess,
};

/// Spawns the node as a real child process
///
/// Both output streams are piped and forwarded line by line (bytes kept
/// verbatim, newline included, lines split at MAX_LINE_BYTES). The exit
/// event is sent once both pipes reach EOF or `drain_timeout` passes after
/// the child exited. The child is killed if its owning task is dropped.
pub struct TokioProcessSpawner {
    graceful_timeout: Duration,
    drain_timeout: Duration,
}

impl TokioProcessSpawner {
    /// Create a spawner
    ///
    /// # Arguments
    /// * `graceful_timeout` - Time between SIGTERM and SIGKILL on kill()
    pub fn new(graceful_timeout: Duration) -> Self {
        Self {
            graceful_timeout,
            drain_timeout: PIPE_DRAIN_TIMEOUT,
        }
    }

    /// Override how long output pipes may outlive the child
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

impl Default for TokioProcessSpawner {
    fn default() -> Self {
        Self::new(GRACEFUL_SHUTDOWN_TIMEOUT)
    }
}

#[async_trait]
impl ProcessSpawner for TokioProcessSpawner {
    async fn spawn(&self, program: &Path, args: &[String]) -> Result<SpawnedProcess, SpawnError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let pid = child.id();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward(stdout, OutputStream::Stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward(stderr, OutputStream::Stderr, tx.clone())));
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(watch_child(
            child,
            pid,
            readers,
            kill_rx,
            tx,
            self.graceful_timeout,
            self.drain_timeout,
        ));

        debug!(pid = ?pid, program = %program.display(), "Child process spawned");

        Ok(SpawnedProcess {
            pid,
            events: rx,
            control: Box::new(ChildControl {
                kill_tx: Mutex::new(Some(kill_tx)),
            }),
        })
    }
}

/// kill() handle: one-shot request to the task owning the child
struct ChildControl {
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessControl for ChildControl {
    fn kill(&self) {
        let sender = self
            .kill_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
    }
}

fn spawn_error(program: &Path, e: io::Error) -> SpawnError {
    let program = program.display().to_string();
    match e.kind() {
        io::ErrorKind::NotFound => SpawnError::NotFound(program),
        io::ErrorKind::PermissionDenied => SpawnError::PermissionDenied(program),
        _ => SpawnError::Failed(format!("{}: {}", program, e)),
    }
}

/// Forward one pipe to the event channel until EOF, one chunk per line
async fn forward<R>(pipe: R, stream: OutputStream, tx: mpsc::UnboundedSender<ProcessEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut line = (&mut reader).take(MAX_LINE_BYTES as u64);
        match line.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                // Pipe keeps draining with no listener left
                let _ = tx.send(ProcessEvent::Output {
                    stream,
                    chunk: buf.clone(),
                });
            }
            Err(e) => {
                warn!(stream = ?stream, error = %e, "Failed to read child output");
                break;
            }
        }
    }
}

/// Own the child: wait for exit or a kill request, drain readers, report
async fn watch_child(
    mut child: Child,
    pid: Option<u32>,
    mut readers: Vec<JoinHandle<()>>,
    mut kill_rx: oneshot::Receiver<()>,
    tx: mpsc::UnboundedSender<ProcessEvent>,
    graceful_timeout: Duration,
    drain_timeout: Duration,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        // A dropped control handle counts as a kill request
        _ = &mut kill_rx => terminate(&mut child, pid, graceful_timeout).await,
    };

    let drained = tokio::time::timeout(drain_timeout, async {
        for reader in readers.iter_mut() {
            let _ = reader.await;
        }
    })
    .await;
    if drained.is_err() {
        // Pipes inherited by a surviving descendant
        warn!(
            pid = ?pid,
            timeout_ms = %drain_timeout.as_millis(),
            "Output pipes still open after exit, abandoning them"
        );
        for reader in &readers {
            reader.abort();
        }
    }

    let event = match status {
        Ok(status) => {
            let info = exit_info(&status);
            debug!(pid = ?pid, code = ?info.code, signal = ?info.signal, "Child process exited");
            ProcessEvent::Exited(info)
        }
        Err(e) => ProcessEvent::Failed(format!("wait failed: {}", e)),
    };
    let _ = tx.send(event);
}

/// SIGTERM first, then SIGKILL after `graceful_timeout`
async fn terminate(
    child: &mut Child,
    pid: Option<u32>,
    graceful_timeout: Duration,
) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = pid {
            info!(pid = %pid, "Sending SIGTERM for graceful shutdown");
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => {
                    if let Ok(status) = tokio::time::timeout(graceful_timeout, child.wait()).await {
                        return status;
                    }
                    warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "SIGTERM failed, forcing kill");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = graceful_timeout;
        info!(pid = ?pid, "Killing process");
    }

    if let Err(e) = child.start_kill() {
        debug!(pid = ?pid, error = %e, "Kill request failed, process probably gone");
    }
    child.wait().await
}

fn exit_info(status: &ExitStatus) -> ExitStatusInfo {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal = None;

    ExitStatusInfo {
        code: status.code(),
        signal,
    }
}
