//! Host-side implementations of the supervisor's outbound ports

use tokio::sync::watch;
use tracing::{error, warn};

use fether_core::port::{ErrorSink, HostControl};
use fether_core::SupervisorError;

/// Reports supervisor failures to the host log
pub struct LoggingErrorSink;

impl ErrorSink for LoggingErrorSink {
    fn report(&self, err: &SupervisorError, context: &str) {
        error!(error = %err, context = %context, "Node supervisor error");
    }
}

/// Turns a terminate request into a pending host exit status
///
/// The diagnostic goes to stderr so it stays visible even with json logs;
/// main() observes the status and runs the normal shutdown path.
pub struct ProcessHost {
    exit_tx: watch::Sender<Option<i32>>,
}

impl ProcessHost {
    pub fn new() -> (Self, watch::Receiver<Option<i32>>) {
        let (exit_tx, exit_rx) = watch::channel(None);
        (Self { exit_tx }, exit_rx)
    }
}

impl HostControl for ProcessHost {
    fn terminate(&self, status: i32, diagnostic: &str) {
        warn!(status = %status, "Node rejected its arguments, shutting down");
        eprintln!("{}", diagnostic);

        // First request wins
        self.exit_tx.send_if_modified(|pending| {
            if pending.is_some() {
                return false;
            }
            *pending = Some(status);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminate_publishes_status() {
        let (host, mut exit_rx) = ProcessHost::new();
        assert_eq!(*exit_rx.borrow(), None);

        host.terminate(1, "Parity failed to start: unknown flag --bogus");

        tokio_test::assert_ok!(exit_rx.changed().await);
        assert_eq!(*exit_rx.borrow(), Some(1));
    }

    #[test]
    fn test_first_terminate_wins() {
        let (host, exit_rx) = ProcessHost::new();

        host.terminate(1, "first");
        host.terminate(2, "second");

        assert_eq!(*exit_rx.borrow(), Some(1));
    }
}
