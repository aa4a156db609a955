// Log Sink Port
// Per-launch append-only log of the node's combined output

use std::io;

/// An open, append-only log for one launch cycle
pub trait LogSink: Send {
    fn append(&mut self, chunk: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Where node logs live
///
/// Implementations:
/// - FileLogStore: `<data_dir>/parity.log`
/// - mocks::MemoryLogStore: in-memory buffer for tests
pub trait LogStore: Send + Sync {
    /// Discard the previous cycle's log and open a fresh sink
    fn open_fresh(&self) -> io::Result<Box<dyn LogSink>>;

    /// Full content of the current log
    fn read_all(&self) -> io::Result<String>;

    /// Human-readable location (path) for log messages and status
    fn location(&self) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory log store
    #[derive(Clone, Default)]
    pub struct MemoryLogStore {
        buffer: Arc<Mutex<Vec<u8>>>,
        fail_open: bool,
        fail_writes: bool,
    }

    impl MemoryLogStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// open_fresh() always fails (unwritable directory)
        pub fn unopenable() -> Self {
            Self {
                fail_open: true,
                ..Self::default()
            }
        }

        /// opens fine but every append fails (disk full)
        pub fn unwritable() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
        }
    }

    struct MemorySink {
        buffer: Arc<Mutex<Vec<u8>>>,
        fail_writes: bool,
    }

    impl LogSink for MemorySink {
        fn append(&mut self, chunk: &[u8]) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            self.buffer.lock().unwrap().extend_from_slice(chunk);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogStore for MemoryLogStore {
        fn open_fresh(&self) -> io::Result<Box<dyn LogSink>> {
            if self.fail_open {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "log directory is read-only",
                ));
            }
            self.buffer.lock().unwrap().clear();
            Ok(Box::new(MemorySink {
                buffer: Arc::clone(&self.buffer),
                fail_writes: self.fail_writes,
            }))
        }

        fn read_all(&self) -> io::Result<String> {
            if self.fail_open {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no log"));
            }
            Ok(self.contents())
        }

        fn location(&self) -> String {
            "memory://parity.log".to_string()
        }
    }
}
