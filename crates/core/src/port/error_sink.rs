// Error Sink Port - the single "handle and report" channel

use crate::error::SupervisorError;

/// Generic error channel for user-facing failures
pub trait ErrorSink: Send + Sync {
    /// Report one failure. `context` is a short user-facing summary.
    fn report(&self, error: &SupervisorError, context: &str);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every reported error as its display string
    #[derive(Default)]
    pub struct RecordingErrorSink {
        events: Mutex<Vec<String>>,
    }

    impl RecordingErrorSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.events.lock().unwrap().len()
        }

        pub fn messages(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ErrorSink for RecordingErrorSink {
        fn report(&self, error: &SupervisorError, _context: &str) {
            self.events.lock().unwrap().push(error.to_string());
        }
    }
}
