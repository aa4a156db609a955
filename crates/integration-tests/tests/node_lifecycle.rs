//! Node lifecycle against real child processes
//!
//! Shell scripts stand in for parity; exit classification, log capture and
//! kill() are exercised end to end through the tokio spawner.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{node, write_node_script, LOCK_LINE};
use fether_core::domain::{ExitKind, ProcessState};
use fether_core::port::LogStore;

const WAIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn test_lock_conflict_is_benign() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(
        &node.install_dir,
        // Same stream as the lock line, so the order is fixed
        &format!("echo 'Starting Parity' >&2\necho '{}' >&2\nexit 1", LOCK_LINE),
    );

    let handle = node.supervisor.start(vec![]).await;
    assert!(handle.is_some());
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(
        node.supervisor.state(),
        ProcessState::Exited(ExitKind::BenignConflict)
    );
    assert!(!node.supervisor.is_running());
    assert_eq!(node.errors.count(), 0);
    assert!(node.host.exits().is_empty());

    let log = node.logs.read_all().unwrap();
    assert!(log.contains("Starting Parity"));
    assert!(log.contains(LOCK_LINE));
}

#[tokio::test]
async fn test_rejected_arguments_terminate_host_with_full_log() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(
        &node.install_dir,
        "echo 'Loading config'\necho \"error: Found argument '$1' which wasn't expected\" >&2\nexit 2",
    );

    node.supervisor
        .start(vec!["--bogus".to_string()])
        .await
        .unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    let exits = node.host.exits();
    assert_eq!(exits.len(), 1);
    let (status, diagnostic) = &exits[0];
    assert_eq!(*status, 1);
    assert!(diagnostic.contains("Loading config"));
    assert!(diagnostic.contains("--bogus"));
    assert_eq!(node.errors.count(), 0);
    assert_eq!(
        node.supervisor.state(),
        ProcessState::Exited(ExitKind::Failed)
    );
}

#[tokio::test]
async fn test_runtime_failure_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(
        &node.install_dir,
        "echo \"thread 'main' panicked at 'database corrupted'\" >&2\nexit 101",
    );

    node.supervisor.start(vec![]).await.unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(node.errors.count(), 1);
    assert!(node.errors.messages()[0].contains("101"));
    assert!(node.host.exits().is_empty());
    assert_eq!(
        node.supervisor.snapshot().last_exit.and_then(|e| e.code),
        Some(101)
    );
}

#[tokio::test]
async fn test_clean_exit_is_expected() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(&node.install_dir, "echo 'Finishing work, please wait...'\nexit 0");

    node.supervisor.start(vec![]).await.unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(
        node.supervisor.state(),
        ProcessState::Exited(ExitKind::Expected)
    );
    assert_eq!(node.errors.count(), 0);
    assert!(node.host.exits().is_empty());
}

#[tokio::test]
async fn test_kill_stops_long_running_node() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(&node.install_dir, "echo 'Syncing'\nexec sleep 30");
    let mut health = node.supervisor.subscribe_health();

    let handle = node.supervisor.start(vec![]).await.unwrap();
    assert!(handle.pid.is_some());
    assert!(node.supervisor.is_running());

    node.supervisor.kill();
    node.supervisor.kill();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(node.supervisor.state(), ProcessState::Killed);
    assert_eq!(health.try_recv().unwrap(), true);
    assert_eq!(health.try_recv().unwrap(), false);
    assert!(health.try_recv().is_err());
    // Terminated by us: not a failure
    assert_eq!(node.errors.count(), 0);
    assert!(node.host.exits().is_empty());
}

#[tokio::test]
async fn test_each_launch_starts_a_fresh_log() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    std::fs::write(
        dir.path().join("parity.log"),
        "output of a previous session\n",
    )
    .unwrap();
    write_node_script(&node.install_dir, "echo \"run $1\"\nexit 0");

    node.supervisor
        .start(vec!["first".to_string()])
        .await
        .unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);
    node.supervisor
        .start(vec!["second".to_string()])
        .await
        .unwrap();
    assert!(node.supervisor.wait_for_exit(WAIT).await);

    assert_eq!(node.logs.read_all().unwrap(), "run second\n");
}

#[tokio::test]
async fn test_missing_binary_without_fetch_command() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());

    assert!(node.supervisor.start(vec![]).await.is_none());

    assert_eq!(node.errors.count(), 1);
    assert_eq!(node.supervisor.state(), ProcessState::NotStarted);
    assert!(!node.supervisor.is_running());
}
