// Host Control Port
// Lets the supervisor end the host application on unrecoverable failures

/// Host application lifecycle control
pub trait HostControl: Send + Sync {
    /// Terminate the host with `status`, showing `diagnostic` to the user
    fn terminate(&self, status: i32, diagnostic: &str);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records terminate() calls instead of exiting
    #[derive(Default)]
    pub struct RecordingHost {
        exits: Mutex<Vec<(i32, String)>>,
    }

    impl RecordingHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn exits(&self) -> Vec<(i32, String)> {
            self.exits.lock().unwrap().clone()
        }
    }

    impl HostControl for RecordingHost {
        fn terminate(&self, status: i32, diagnostic: &str) {
            self.exits
                .lock()
                .unwrap()
                .push((status, diagnostic.to_string()));
        }
    }
}
