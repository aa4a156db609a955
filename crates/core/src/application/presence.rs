// Presence & Acquisition Gate
use crate::port::{Acquirer, AcquisitionError, BinaryLocator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Makes sure the node binary exists before launch
pub struct BinaryGate {
    locator: Arc<dyn BinaryLocator>,
    acquirer: Arc<dyn Acquirer>,
}

impl BinaryGate {
    pub fn new(locator: Arc<dyn BinaryLocator>, acquirer: Arc<dyn Acquirer>) -> Self {
        Self { locator, acquirer }
    }

    /// Resolve the node binary, acquiring it first if absent
    ///
    /// With the binary already present this is a plain existence check
    /// and the acquirer is never called.
    ///
    /// # Errors
    /// - whatever the acquirer fails with
    /// - AcquisitionError::StillMissing if acquisition reported success but
    ///   the locator still cannot find the binary
    pub async fn ensure_binary_available(&self) -> Result<PathBuf, AcquisitionError> {
        if let Some(path) = self.locator.locate() {
            info!(path = %path.display(), "Node binary found");
            return Ok(path);
        }

        info!("Node binary not found, acquiring");
        let installed = self.acquirer.acquire().await?;

        match self.locator.locate() {
            Some(path) => {
                info!(path = %path.display(), "Node binary installed");
                Ok(path)
            }
            None => {
                warn!(
                    expected = %installed.display(),
                    "Acquisition finished but node binary is still missing"
                );
                Err(AcquisitionError::StillMissing(
                    installed.display().to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::binary::mocks::{AcquireBehavior, FixedLocator, MockAcquirer};

    #[tokio::test]
    async fn test_present_binary_skips_acquisition() {
        let locator = Arc::new(FixedLocator::present("/usr/bin/parity"));
        let acquirer = Arc::new(MockAcquirer::failing(AcquisitionError::NotConfigured));
        let gate = BinaryGate::new(locator.clone(), acquirer.clone());

        for _ in 0..3 {
            let path = gate.ensure_binary_available().await.unwrap();
            assert_eq!(path, PathBuf::from("/usr/bin/parity"));
        }
        assert_eq!(acquirer.call_count(), 0);
        assert_eq!(locator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_absent_binary_is_acquired_and_re_resolved() {
        let locator = Arc::new(FixedLocator::absent());
        let acquirer = Arc::new(MockAcquirer::installing(
            "/data/fether/bin/parity",
            locator.clone(),
        ));
        let gate = BinaryGate::new(locator.clone(), acquirer.clone());

        let path = tokio_test::assert_ok!(gate.ensure_binary_available().await);
        assert_eq!(path, PathBuf::from("/data/fether/bin/parity"));
        assert_eq!(acquirer.call_count(), 1);
        assert_eq!(locator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_acquisition_failure_propagates() {
        let locator = Arc::new(FixedLocator::absent());
        let acquirer = Arc::new(MockAcquirer::failing(AcquisitionError::CommandFailed(
            "curl: (6) Could not resolve host".to_string(),
        )));
        let gate = BinaryGate::new(locator, acquirer);

        let err = tokio_test::assert_err!(gate.ensure_binary_available().await);
        assert!(matches!(err, AcquisitionError::CommandFailed(_)));
    }

    #[tokio::test]
    async fn test_success_without_binary_is_still_missing() {
        let locator = Arc::new(FixedLocator::absent());
        let acquirer = Arc::new(MockAcquirer::new(AcquireBehavior::InstallNothing(
            PathBuf::from("/data/fether/bin/parity"),
        )));
        let gate = BinaryGate::new(locator, acquirer);

        let err = gate.ensure_binary_available().await.unwrap_err();
        assert_eq!(
            err,
            AcquisitionError::StillMissing("/data/fether/bin/parity".to_string())
        );
    }
}
