//! Binary acquisition through a real fetch command

#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::node_with;
use fether_core::domain::{ExitKind, ProcessState};
use fether_core::port::AcquisitionError;
use fether_infra_system::CommandAcquirer;

const WAIT: Duration = Duration::from_secs(10);

/// Fetch command that drops a node script exiting with `code`
fn installing_command(code: i32) -> String {
    format!(
        "printf '#!/bin/sh\\necho fetched node\\nexit {}\\n' > \"$FETHER_INSTALL_DIR/parity\"",
        code
    )
}

#[tokio::test]
async fn test_fetch_then_launch() {
    let dir = tempfile::tempdir().unwrap();
    let install_dir = dir.path().join("bin");
    let acquirer = CommandAcquirer::new(Some(installing_command(0)), &install_dir);
    let node = node_with(dir.path(), Arc::new(acquirer));

    let path = tokio_test::assert_ok!(node.supervisor.ensure_binary_available().await);
    assert_eq!(path, install_dir.join("parity"));

    node.supervisor.start(vec![]).await.unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(
        node.supervisor.state(),
        ProcessState::Exited(ExitKind::Expected)
    );
    assert_eq!(node.errors.count(), 0);
}

#[tokio::test]
async fn test_present_binary_skips_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fetched");
    let acquirer = CommandAcquirer::new(
        Some(format!("touch '{}'", marker.display())),
        dir.path().join("bin"),
    );
    let node = node_with(dir.path(), Arc::new(acquirer));
    common::write_node_script(&node.install_dir, "exit 0");

    tokio_test::assert_ok!(node.supervisor.ensure_binary_available().await);

    assert!(!marker.exists());
}

#[tokio::test]
async fn test_failed_fetch_aborts_launch() {
    let dir = tempfile::tempdir().unwrap();
    let acquirer = CommandAcquirer::new(
        Some("echo 'could not resolve host' >&2; exit 6".to_string()),
        dir.path().join("bin"),
    );
    let node = node_with(dir.path(), Arc::new(acquirer));

    assert!(node.supervisor.start(vec![]).await.is_none());

    assert_eq!(node.errors.count(), 1);
    assert!(node.errors.messages()[0].contains("could not resolve host"));
    assert_eq!(node.supervisor.state(), ProcessState::NotStarted);
    assert!(!node.supervisor.is_running());
}

#[tokio::test]
async fn test_fetch_that_installs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let acquirer = CommandAcquirer::new(Some("true".to_string()), dir.path().join("bin"));
    let node = node_with(dir.path(), Arc::new(acquirer));

    let err = tokio_test::assert_err!(node.supervisor.ensure_binary_available().await);
    assert!(matches!(err, AcquisitionError::StillMissing(_)));
}
