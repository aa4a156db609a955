// Binary locator implementation
use std::path::{Path, PathBuf};
use tracing::debug;

use fether_core::application::constants::NODE_BINARY_NAME;
use fether_core::port::BinaryLocator;

/// Finds the node binary on the local filesystem
///
/// Search order (first runnable file wins):
/// 1. explicit override
/// 2. the host's own install directory
/// 3. platform default install locations
/// 4. every directory on `PATH`
pub struct FsBinaryLocator {
    override_path: Option<PathBuf>,
    install_dir: PathBuf,
    system_locations: bool,
}

impl FsBinaryLocator {
    /// # Arguments
    /// * `install_dir` - Directory the acquirer installs into
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            override_path: None,
            install_dir: install_dir.into(),
            system_locations: true,
        }
    }

    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path;
        self
    }

    /// Only consider the override and the install directory
    pub fn without_system_locations(mut self) -> Self {
        self.system_locations = false;
        self
    }

    /// Where an acquired binary is expected to land
    pub fn install_path(&self) -> PathBuf {
        self.install_dir.join(NODE_BINARY_NAME)
    }

    /// All candidate paths, in search order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        candidates.extend(self.override_path.clone());
        candidates.push(self.install_path());

        if self.system_locations {
            candidates.extend(platform_defaults());
            if let Some(path_var) = std::env::var_os("PATH") {
                candidates.extend(
                    std::env::split_paths(&path_var).map(|dir| dir.join(NODE_BINARY_NAME)),
                );
            }
        }
        candidates
    }
}

impl BinaryLocator for FsBinaryLocator {
    fn locate(&self) -> Option<PathBuf> {
        let found = self.candidates().into_iter().find(|p| is_runnable(p));
        debug!(found = ?found, "Node binary lookup");
        found
    }
}

fn platform_defaults() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![PathBuf::from(
            "/Applications/Parity Ethereum.app/Contents/MacOS/parity",
        )]
    } else if cfg!(windows) {
        vec![PathBuf::from(
            r"C:\Program Files\Parity Technologies\Parity\parity.exe",
        )]
    } else {
        vec![
            PathBuf::from("/usr/bin/parity"),
            PathBuf::from("/usr/local/bin/parity"),
        ]
    }
}

fn is_runnable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
