// Exit classification

use super::process::{ExitKind, ExitStatusInfo};

/// Log substrings the node prints when another instance already holds
/// the websocket port or the database lock. Exits carrying one of these
/// are yielded silently.
pub const CATCHABLE_ERRORS: &[&str] = &[
    "is already in use, make sure that another instance of an Ethereum client is not running or change the address using the --ws-port and --ws-interface options.",
    "IO error: While lock file:",
];

/// Outcome of classifying a node exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    Expected,
    BenignConflict,
    /// Non-zero exit while running with caller-supplied arguments
    ArgumentFailure,
    /// Non-zero exit with default arguments
    RuntimeFailure,
}

impl ExitClass {
    pub fn kind(&self) -> ExitKind {
        match self {
            ExitClass::Expected => ExitKind::Expected,
            ExitClass::BenignConflict => ExitKind::BenignConflict,
            ExitClass::ArgumentFailure | ExitClass::RuntimeFailure => ExitKind::Failed,
        }
    }
}

/// True if the line contains any member of [`CATCHABLE_ERRORS`]
pub fn is_catchable(line: &str) -> bool {
    CATCHABLE_ERRORS.iter().any(|needle| line.contains(*needle))
}

/// Classify an exit from its status, the last captured log line and
/// whether the launch used caller-supplied arguments.
///
/// Precedence: clean exit, then benign conflict, then argument failure,
/// then generic runtime failure.
pub fn classify_exit(
    status: &ExitStatusInfo,
    last_line: Option<&str>,
    caller_supplied: bool,
) -> ExitClass {
    if status.success() {
        return ExitClass::Expected;
    }

    if last_line.is_some_and(is_catchable) {
        return ExitClass::BenignConflict;
    }

    if caller_supplied {
        ExitClass::ArgumentFailure
    } else {
        ExitClass::RuntimeFailure
    }
}
