//! Shared fixtures: a real supervisor wired to scripted stand-ins for parity

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fether_core::port::binary::mocks::MockAcquirer;
use fether_core::port::error_sink::mocks::RecordingErrorSink;
use fether_core::port::host::mocks::RecordingHost;
use fether_core::port::id_provider::UuidProvider;
use fether_core::port::time_provider::SystemTimeProvider;
use fether_core::port::{Acquirer, AcquisitionError, BinaryLocator};
use fether_core::{NodeSupervisor, SupervisorPorts};
use fether_infra_system::{FileLogStore, FsBinaryLocator, TokioProcessSpawner};

pub const LOCK_LINE: &str =
    "IO error: While lock file: /tmp/fether/chains/ethereum/db/LOCK: Resource temporarily unavailable";

/// Write an executable shell script named `parity` into `dir`
pub fn write_node_script(dir: &Path, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("parity");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub struct Node {
    pub supervisor: NodeSupervisor,
    pub logs: Arc<FileLogStore>,
    pub errors: Arc<RecordingErrorSink>,
    pub host: Arc<RecordingHost>,
    pub install_dir: PathBuf,
}

/// Supervisor over real processes, with the binary looked up in
/// `<data_dir>/bin` only
pub fn node_with(data_dir: &Path, acquirer: Arc<dyn Acquirer>) -> Node {
    let install_dir = data_dir.join("bin");
    let locator: Arc<dyn BinaryLocator> =
        Arc::new(FsBinaryLocator::new(&install_dir).without_system_locations());
    let logs = Arc::new(FileLogStore::in_dir(data_dir));
    let errors = Arc::new(RecordingErrorSink::new());
    let host = Arc::new(RecordingHost::new());

    let supervisor = NodeSupervisor::new(SupervisorPorts {
        locator,
        acquirer,
        spawner: Arc::new(TokioProcessSpawner::default()),
        log_store: logs.clone(),
        error_sink: errors.clone(),
        host: host.clone(),
        id_provider: Arc::new(UuidProvider),
        time_provider: Arc::new(SystemTimeProvider),
    });

    Node {
        supervisor,
        logs,
        errors,
        host,
        install_dir,
    }
}

/// Supervisor whose acquisition step is never expected to succeed
pub fn node(data_dir: &Path) -> Node {
    node_with(
        data_dir,
        Arc::new(MockAcquirer::failing(AcquisitionError::NotConfigured)),
    )
}
