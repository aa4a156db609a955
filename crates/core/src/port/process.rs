// Process Spawner Port
// Abstraction over the OS process primitive so the lifecycle state machine
// can be driven by fake processes in tests

use crate::domain::ExitStatusInfo;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;

/// Which output stream a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Discrete notifications from a running process
///
/// Contract for implementations:
/// - `Output` events of one stream arrive in the order they were written
/// - exactly one terminal event (`Exited` or `Failed`) is sent last
/// - `Exited` is sent only after both streams have been drained
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Output {
        stream: OutputStream,
        chunk: Vec<u8>,
    },
    Exited(ExitStatusInfo),
    /// The process could not be observed any further (wait failed, pipe error)
    Failed(String),
}

/// OS-level spawn errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Binary not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Spawn failed: {0}")]
    Failed(String),
}

/// Termination capability of a spawned process
pub trait ProcessControl: Send + Sync {
    /// Request termination without waiting for it.
    ///
    /// Must be safe to call more than once.
    fn kill(&self);
}

/// Handle returned by a successful spawn
pub struct SpawnedProcess {
    pub pid: Option<u32>,
    pub events: mpsc::UnboundedReceiver<ProcessEvent>,
    pub control: Box<dyn ProcessControl>,
}

/// Process spawner trait
///
/// Implementations:
/// - TokioProcessSpawner: real child process with piped output
/// - mocks::FakeSpawner: scripted events for tests
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Start `program` with `args`, piping both output streams
    ///
    /// # Errors
    /// - SpawnError::NotFound if the binary does not exist
    /// - SpawnError::PermissionDenied if it is not executable
    async fn spawn(&self, program: &Path, args: &[String]) -> Result<SpawnedProcess, SpawnError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Test-side end of a fake process: push events, observe kills
    #[derive(Clone)]
    pub struct FakeProcess {
        events: mpsc::UnboundedSender<ProcessEvent>,
        kills: Arc<AtomicUsize>,
    }

    impl FakeProcess {
        pub fn emit(&self, stream: OutputStream, text: &str) {
            let _ = self.events.send(ProcessEvent::Output {
                stream,
                chunk: text.as_bytes().to_vec(),
            });
        }

        pub fn stdout(&self, text: &str) {
            self.emit(OutputStream::Stdout, text);
        }

        pub fn stderr(&self, text: &str) {
            self.emit(OutputStream::Stderr, text);
        }

        pub fn exit(&self, code: i32) {
            let _ = self
                .events
                .send(ProcessEvent::Exited(ExitStatusInfo::from_code(code)));
        }

        pub fn exit_with(&self, status: ExitStatusInfo) {
            let _ = self.events.send(ProcessEvent::Exited(status));
        }

        pub fn fail(&self, message: impl Into<String>) {
            let _ = self.events.send(ProcessEvent::Failed(message.into()));
        }

        pub fn kill_count(&self) -> usize {
            self.kills.load(Ordering::SeqCst)
        }
    }

    struct FakeControl {
        kills: Arc<AtomicUsize>,
    }

    impl ProcessControl for FakeControl {
        fn kill(&self) {
            self.kills.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Fake spawner recording every spawn call
    pub struct FakeSpawner {
        fail_with: Mutex<Option<SpawnError>>,
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
        processes: Mutex<Vec<FakeProcess>>,
    }

    impl FakeSpawner {
        pub fn new() -> Self {
            Self {
                fail_with: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
                processes: Mutex::new(Vec::new()),
            }
        }

        pub fn new_failing(error: SpawnError) -> Self {
            let spawner = Self::new();
            *spawner.fail_with.lock().unwrap() = Some(error);
            spawner
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }

        /// Most recently spawned fake process
        pub fn last(&self) -> FakeProcess {
            self.processes
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no process spawned yet")
        }
    }

    impl Default for FakeSpawner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProcessSpawner for FakeSpawner {
        async fn spawn(
            &self,
            program: &Path,
            args: &[String],
        ) -> Result<SpawnedProcess, SpawnError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec()));

            if let Some(err) = self.fail_with.lock().unwrap().clone() {
                return Err(err);
            }

            let (tx, rx) = mpsc::unbounded_channel();
            let kills = Arc::new(AtomicUsize::new(0));
            let mut processes = self.processes.lock().unwrap();
            processes.push(FakeProcess {
                events: tx,
                kills: Arc::clone(&kills),
            });

            Ok(SpawnedProcess {
                pid: Some(4000 + processes.len() as u32),
                events: rx,
                control: Box::new(FakeControl { kills }),
            })
        }
    }
}
