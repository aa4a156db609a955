// Supervisor constants (no magic values)
use std::time::Duration;

/// File name of the node binary inside install directories
#[cfg(windows)]
pub const NODE_BINARY_NAME: &str = "parity.exe";
#[cfg(not(windows))]
pub const NODE_BINARY_NAME: &str = "parity";

/// File name of the per-launch node log
pub const LOG_FILE_NAME: &str = "parity.log";

/// User-facing context attached to node failures
pub const NODE_ERROR_CONTEXT: &str = "An error occurred while running parity.";

/// User-facing context attached to acquisition failures
pub const ACQUISITION_ERROR_CONTEXT: &str = "An error occurred while downloading parity.";

/// Host exit status after the node rejected caller-supplied arguments
pub const ARGUMENT_FAILURE_EXIT_STATUS: i32 = 1;

/// Grace period between SIGTERM and SIGKILL when stopping the node (5 seconds)
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// How long output pipes may stay open after the node exited (2 seconds).
/// A grandchild can inherit them and hold them open indefinitely.
pub const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Longest output line forwarded as one chunk (64 KiB)
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Target for node output echoed to the host log
pub const NODE_OUTPUT_TARGET: &str = "fether::node";

/// How long the host waits for the node to go away on shutdown (8 seconds).
/// Must exceed GRACEFUL_SHUTDOWN_TIMEOUT plus PIPE_DRAIN_TIMEOUT.
pub const SHUTDOWN_WAIT_TIMEOUT: Duration = Duration::from_secs(8);

/// Default limit for the fetch command (10 minutes)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10 * 60);
