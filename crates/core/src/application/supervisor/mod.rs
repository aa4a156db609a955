// Node Supervisor - single owner of the supervised node process
//
// Lifecycle (one launch cycle):
//   NotStarted -> Starting -> Running -> Exited(Expected | BenignConflict | Failed)
//                                     \-> Killed
//
// Output and exit notifications arrive on a per-launch event channel and
// are consumed in order by one pump task per cycle.

use crate::application::constants::{
    ACQUISITION_ERROR_CONTEXT, ARGUMENT_FAILURE_EXIT_STATUS, NODE_ERROR_CONTEXT,
};
use crate::application::log_capture::LogCapture;
use crate::application::presence::BinaryGate;
use crate::domain::{
    classify_exit, ExitClass, ExitKind, ExitStatusInfo, HealthSignal, ProcessState,
};
use crate::error::{Result, SupervisorError};
use crate::port::{
    Acquirer, AcquisitionError, BinaryLocator, ErrorSink, HostControl, IdProvider, LogStore,
    ProcessControl, ProcessEvent, ProcessSpawner, SpawnedProcess, TimeProvider,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Everything the supervisor talks to
pub struct SupervisorPorts {
    pub locator: Arc<dyn BinaryLocator>,
    pub acquirer: Arc<dyn Acquirer>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub log_store: Arc<dyn LogStore>,
    pub error_sink: Arc<dyn ErrorSink>,
    pub host: Arc<dyn HostControl>,
    pub id_provider: Arc<dyn IdProvider>,
    pub time_provider: Arc<dyn TimeProvider>,
}

/// Returned by a successful launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningHandle {
    pub run_id: String,
    pub pid: Option<u32>,
}

/// Read-only view of the supervisor for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorSnapshot {
    pub state: ProcessState,
    pub running: bool,
    pub pid: Option<u32>,
    pub run_id: Option<String>,
    pub started_at: Option<i64>,
    pub args: Vec<String>,
    pub last_exit: Option<ExitStatusInfo>,
    pub last_error: Option<String>,
    pub log_path: String,
}

/// The single live process handle
struct LiveProcess {
    cycle: u64,
    run_id: String,
    pid: Option<u32>,
    args: Vec<String>,
    started_at: i64,
    control: Box<dyn ProcessControl>,
}

struct Inner {
    state: ProcessState,
    live: Option<LiveProcess>,
    cycle: u64,
    last_exit: Option<ExitStatusInfo>,
    last_error: Option<String>,
    pump: Option<JoinHandle<()>>,
}

/// State shared with the per-cycle pump task
struct Shared {
    inner: Mutex<Inner>,
    health: HealthSignal,
    log_store: Arc<dyn LogStore>,
    error_sink: Arc<dyn ErrorSink>,
    host: Arc<dyn HostControl>,
}

enum Terminal {
    Exited(ExitStatusInfo),
    Failed(String),
}

/// Supervises at most one node process
///
/// Construct one per host application and share it behind an `Arc`.
/// Dropping the supervisor kills the live process.
pub struct NodeSupervisor {
    shared: Arc<Shared>,
    gate: BinaryGate,
    spawner: Arc<dyn ProcessSpawner>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl NodeSupervisor {
    pub fn new(ports: SupervisorPorts) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ProcessState::NotStarted,
                    live: None,
                    cycle: 0,
                    last_exit: None,
                    last_error: None,
                    pump: None,
                }),
                health: HealthSignal::new(),
                log_store: ports.log_store,
                error_sink: ports.error_sink,
                host: ports.host,
            }),
            gate: BinaryGate::new(ports.locator, ports.acquirer),
            spawner: ports.spawner,
            id_provider: ports.id_provider,
            time_provider: ports.time_provider,
        }
    }

    /// Presence check, acquiring the binary if needed
    pub async fn ensure_binary_available(&self) -> std::result::Result<PathBuf, AcquisitionError> {
        self.gate.ensure_binary_available().await
    }

    /// Gate + launch. Every failure is reported to the error sink exactly
    /// once; `None` means the node is not running.
    pub async fn start(&self, args: Vec<String>) -> Option<RunningHandle> {
        let program = match self.ensure_binary_available().await {
            Ok(path) => path,
            Err(e) => {
                self.shared
                    .report(&SupervisorError::Acquisition(e), ACQUISITION_ERROR_CONTEXT);
                return None;
            }
        };

        match self.launch(&program, args).await {
            Ok(handle) => Some(handle),
            // launch() already reported it
            Err(SupervisorError::Spawn(_)) => None,
            Err(e) => {
                self.shared.report(&e, NODE_ERROR_CONTEXT);
                None
            }
        }
    }

    /// Spawn the node and start capturing its output
    ///
    /// # Errors
    /// - SupervisorError::AlreadyRunning if a launch is in flight or the
    ///   node is up; the live handle is left untouched
    /// - SupervisorError::Spawn if the OS could not create the process
    ///   (also reported to the error sink)
    pub async fn launch(&self, program: &Path, args: Vec<String>) -> Result<RunningHandle> {
        let cycle = {
            let mut inner = self.shared.lock();
            if inner.state.is_live() {
                let pid = inner.live.as_ref().and_then(|live| live.pid);
                error!(pid = ?pid, state = %inner.state, "Launch requested while node is live");
                return Err(SupervisorError::AlreadyRunning { pid });
            }
            inner.state = ProcessState::Starting;
            inner.cycle += 1;
            inner.cycle
        };

        let run_id = self.id_provider.generate_id();
        let capture = LogCapture::open(self.shared.log_store.as_ref());

        info!(
            run_id = %run_id,
            program = %program.display(),
            args = ?args,
            log = %capture.location(),
            "Launching node"
        );

        let SpawnedProcess {
            pid,
            events,
            control,
        } = match self.spawner.spawn(program, &args).await {
            Ok(spawned) => spawned,
            Err(e) => {
                self.shared.lock().state = ProcessState::Exited(ExitKind::Failed);
                let err = SupervisorError::Spawn(e);
                self.shared.report(&err, NODE_ERROR_CONTEXT);
                return Err(err);
            }
        };

        let caller_supplied = !args.is_empty();
        {
            let mut inner = self.shared.lock();
            inner.live = Some(LiveProcess {
                cycle,
                run_id: run_id.clone(),
                pid,
                args,
                started_at: self.time_provider.now_millis(),
                control,
            });
            inner.state = ProcessState::Running;
            inner.last_exit = None;
            // kill() lowers it under this same lock
            self.shared.health.set_running(true);
        }
        info!(run_id = %run_id, pid = ?pid, "Node running");

        let pump = tokio::spawn(pump_events(
            Arc::clone(&self.shared),
            cycle,
            caller_supplied,
            capture,
            events,
        ));
        self.shared.lock().pump = Some(pump);

        Ok(RunningHandle { run_id, pid })
    }

    /// Terminate the node without waiting for its exit to be classified
    ///
    /// No-op when nothing is live; safe to call repeatedly and from every
    /// shutdown hook.
    pub fn kill(&self) {
        let live = {
            let mut inner = self.shared.lock();
            let live = inner.live.take();
            if live.is_some() {
                inner.state = ProcessState::Killed;
                self.shared.health.set_running(false);
            }
            live
        };

        if let Some(live) = live {
            info!(run_id = %live.run_id, pid = ?live.pid, "Stopping node");
            live.control.kill();
        }
    }

    /// Wait for the current cycle's pump to finish (exit observed and
    /// handled). Returns false on timeout.
    pub async fn wait_for_exit(&self, timeout: Duration) -> bool {
        let pump = self.shared.lock().pump.take();
        match pump {
            Some(handle) => tokio::time::timeout(timeout, handle).await.is_ok(),
            None => true,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.shared.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.shared.health.is_running()
    }

    /// Every health transition, in order
    pub fn subscribe_health(&self) -> broadcast::Receiver<bool> {
        self.shared.health.subscribe()
    }

    /// Current health value
    pub fn watch_health(&self) -> watch::Receiver<bool> {
        self.shared.health.watch()
    }

    pub fn snapshot(&self) -> SupervisorSnapshot {
        let inner = self.shared.lock();
        let live = inner.live.as_ref();

        SupervisorSnapshot {
            state: inner.state,
            running: self.shared.health.is_running(),
            pid: live.and_then(|l| l.pid),
            run_id: live.map(|l| l.run_id.clone()),
            started_at: live.map(|l| l.started_at),
            args: live.map(|l| l.args.clone()).unwrap_or_default(),
            last_exit: inner.last_exit,
            last_error: inner.last_error.clone(),
            log_path: self.shared.log_store.location(),
        }
    }
}

impl Drop for NodeSupervisor {
    fn drop(&mut self) {
        self.kill();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, err: &SupervisorError, context: &str) {
        self.lock().last_error = Some(err.to_string());
        self.error_sink.report(err, context);
    }

    /// Handle the terminal event of `cycle`
    fn conclude(&self, cycle: u64, caller_supplied: bool, capture: &LogCapture, terminal: Terminal) {
        let live = {
            let mut inner = self.lock();
            let current = inner.live.as_ref().is_some_and(|live| live.cycle == cycle);
            if current {
                inner.live.take()
            } else {
                None
            }
        };

        let Some(live) = live else {
            debug!(cycle = cycle, "Exit of a killed node process, not classified");
            return;
        };

        match terminal {
            Terminal::Exited(status) => {
                let class = classify_exit(&status, capture.last_line(), caller_supplied);
                {
                    let mut inner = self.lock();
                    inner.state = ProcessState::Exited(class.kind());
                    inner.last_exit = Some(status);
                    self.health.set_running(false);
                }

                match class {
                    ExitClass::Expected => {
                        info!(run_id = %live.run_id, "Node exited cleanly");
                    }
                    ExitClass::BenignConflict => {
                        info!(
                            run_id = %live.run_id,
                            last_line = ?capture.last_line(),
                            "Another instance of parity is running, closing local instance"
                        );
                    }
                    ExitClass::ArgumentFailure => {
                        let log = self.full_log(capture);
                        let err = SupervisorError::ArgumentFailure(status);
                        error!(
                            run_id = %live.run_id,
                            args = ?live.args,
                            error = %err,
                            "Node rejected caller-supplied arguments, shutting down"
                        );
                        self.lock().last_error = Some(err.to_string());
                        self.host.terminate(ARGUMENT_FAILURE_EXIT_STATUS, &log);
                    }
                    ExitClass::RuntimeFailure => {
                        warn!(run_id = %live.run_id, status = %status, "Node exited abnormally");
                        self.report(&SupervisorError::RuntimeFailure(status), NODE_ERROR_CONTEXT);
                    }
                }
            }
            Terminal::Failed(message) => {
                {
                    let mut inner = self.lock();
                    inner.state = ProcessState::Exited(ExitKind::Failed);
                    self.health.set_running(false);
                }
                warn!(run_id = %live.run_id, error = %message, "Lost track of node process");
                // Make sure nothing keeps running unobserved
                live.control.kill();
                self.report(&SupervisorError::Process(message), NODE_ERROR_CONTEXT);
            }
        }
    }

    /// Full log for the user; falls back to the tail if the log is unusable
    fn full_log(&self, capture: &LogCapture) -> String {
        let tail = || capture.last_line().unwrap_or_default().to_string();
        if capture.is_degraded() {
            return tail();
        }
        self.log_store.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "Cannot read node log back, showing last line only");
            tail()
        })
    }
}

/// Consume one cycle's events until the terminal one
async fn pump_events(
    shared: Arc<Shared>,
    cycle: u64,
    caller_supplied: bool,
    mut capture: LogCapture,
    mut events: mpsc::UnboundedReceiver<ProcessEvent>,
) {
    let terminal = loop {
        match events.recv().await {
            Some(ProcessEvent::Output { stream, chunk }) => capture.record(stream, &chunk),
            Some(ProcessEvent::Exited(status)) => break Terminal::Exited(status),
            Some(ProcessEvent::Failed(message)) => break Terminal::Failed(message),
            None => {
                break Terminal::Failed("process event stream closed without exit status".to_string())
            }
        }
    };

    capture.finish();
    shared.conclude(cycle, caller_supplied, &capture, terminal);
}
