// Central error type for the supervisor

use thiserror::Error;

use crate::domain::ExitStatusInfo;
use crate::port::{AcquisitionError, SpawnError};

/// Supervisor-level error type
///
/// Everything that reaches the generic error sink is one of these.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    #[error("Node process is already running (pid {pid:?})")]
    AlreadyRunning { pid: Option<u32> },

    #[error("{0}")]
    RuntimeFailure(ExitStatusInfo),

    #[error("Node rejected its arguments: {0}")]
    ArgumentFailure(ExitStatusInfo),

    #[error("Node process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using SupervisorError
pub type Result<T> = std::result::Result<T, SupervisorError>;
