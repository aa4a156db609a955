// Supervised process lifecycle model

use serde::{Deserialize, Serialize};

/// Classification of an observed exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitKind {
    /// Exit code 0
    Expected,
    /// Another instance already owns the port or lock file
    BenignConflict,
    Failed,
}

/// Lifecycle state of the supervised node process
///
/// ```text
/// NotStarted -> Starting -> Running -> Exited(Expected | BenignConflict | Failed)
///                                   \-> Killed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    NotStarted,
    Starting,
    Running,
    Exited(ExitKind),
    Killed,
}

impl ProcessState {
    /// A launch is in flight or the process is up
    pub fn is_live(&self) -> bool {
        matches!(self, ProcessState::Starting | ProcessState::Running)
    }
}

impl std::fmt::Display for ExitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitKind::Expected => write!(f, "EXPECTED"),
            ExitKind::BenignConflict => write!(f, "BENIGN_CONFLICT"),
            ExitKind::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::NotStarted => write!(f, "NOT_STARTED"),
            ProcessState::Starting => write!(f, "STARTING"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Exited(kind) => write!(f, "EXITED({})", kind),
            ProcessState::Killed => write!(f, "KILLED"),
        }
    }
}

/// Exit code and terminating signal as reported by the OS
///
/// A process terminated by a signal has no exit code on unix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatusInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitStatusInfo {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Display for ExitStatusInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        let signal = self
            .signal
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(f, "Exit code {}, with signal {}.", code, signal)
    }
}
