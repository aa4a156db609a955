// Binary presence & acquisition ports
// The download/unpack mechanics live behind Acquirer; core only awaits it

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Acquisition errors (fatal to launch)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("Node binary not found and no fetch command is configured")]
    NotConfigured,

    #[error("Fetch command failed: {0}")]
    CommandFailed(String),

    #[error("Fetch command timed out after {0}ms")]
    Timeout(u64),

    #[error("Node binary still missing after acquisition (expected at {0})")]
    StillMissing(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Cheap existence check over well-known install locations
pub trait BinaryLocator: Send + Sync {
    /// Path of an existing, runnable node binary
    fn locate(&self) -> Option<PathBuf>;
}

/// External collaborator that downloads and installs the node binary
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Install the binary and return where it was put
    ///
    /// # Errors
    /// Any AcquisitionError; the caller aborts the launch.
    async fn acquire(&self) -> Result<PathBuf, AcquisitionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Locator answering from a settable slot
    pub struct FixedLocator {
        path: Mutex<Option<PathBuf>>,
        call_count: Mutex<usize>,
    }

    impl FixedLocator {
        pub fn present(path: impl Into<PathBuf>) -> Self {
            Self {
                path: Mutex::new(Some(path.into())),
                call_count: Mutex::new(0),
            }
        }

        pub fn absent() -> Self {
            Self {
                path: Mutex::new(None),
                call_count: Mutex::new(0),
            }
        }

        pub fn install(&self, path: impl Into<PathBuf>) {
            *self.path.lock().unwrap() = Some(path.into());
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl BinaryLocator for FixedLocator {
        fn locate(&self) -> Option<PathBuf> {
            *self.call_count.lock().unwrap() += 1;
            self.path.lock().unwrap().clone()
        }
    }

    /// Mock acquirer behavior
    #[derive(Debug, Clone)]
    pub enum AcquireBehavior {
        /// Install at path (visible to the paired locator, if any)
        Install(PathBuf),
        /// Report success but leave nothing behind
        InstallNothing(PathBuf),
        Fail(AcquisitionError),
    }

    pub struct MockAcquirer {
        behavior: AcquireBehavior,
        locator: Option<Arc<FixedLocator>>,
        call_count: Mutex<usize>,
    }

    impl MockAcquirer {
        pub fn installing(path: impl Into<PathBuf>, locator: Arc<FixedLocator>) -> Self {
            Self {
                behavior: AcquireBehavior::Install(path.into()),
                locator: Some(locator),
                call_count: Mutex::new(0),
            }
        }

        pub fn new(behavior: AcquireBehavior) -> Self {
            Self {
                behavior,
                locator: None,
                call_count: Mutex::new(0),
            }
        }

        pub fn failing(error: AcquisitionError) -> Self {
            Self::new(AcquireBehavior::Fail(error))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Acquirer for MockAcquirer {
        async fn acquire(&self) -> Result<PathBuf, AcquisitionError> {
            *self.call_count.lock().unwrap() += 1;

            match &self.behavior {
                AcquireBehavior::Install(path) => {
                    if let Some(locator) = &self.locator {
                        locator.install(path.clone());
                    }
                    Ok(path.clone())
                }
                AcquireBehavior::InstallNothing(path) => Ok(path.clone()),
                AcquireBehavior::Fail(err) => Err(err.clone()),
            }
        }
    }
}
