//! Status server over HTTP with a real supervised process

#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{node, write_node_script};
use fether_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use fether_infra_system::SysinfoProcessInspector;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::HttpClientBuilder;
use jsonrpsee::rpc_params;
use serde_json::Value;

#[tokio::test]
async fn test_status_health_and_tail_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let node = node(dir.path());
    write_node_script(&node.install_dir, "echo 'Starting Parity'\nexec sleep 30");
    let supervisor = Arc::new(node.supervisor);

    let handler = RpcHandler::new(
        supervisor.clone(),
        Arc::new(SysinfoProcessInspector::new()),
        node.logs.clone(),
    );
    let config = RpcServerConfig {
        port: 0,
        ..Default::default()
    };
    let (addr, server) = RpcServer::new(config, handler).start().await.unwrap();
    let client = HttpClientBuilder::default()
        .build(format!("http://{}", addr))
        .unwrap();

    let health: Value = client.request("node.health.v1", rpc_params![]).await.unwrap();
    assert_eq!(health["running"], false);

    let handle = supervisor.start(vec![]).await.unwrap();

    let status: Value = client.request("node.status.v1", rpc_params![]).await.unwrap();
    assert_eq!(status["running"], true);
    assert_eq!(status["state"], "RUNNING");
    assert_eq!(status["pid"], Value::from(handle.pid.unwrap()));
    assert_eq!(status["run_id"], Value::from(handle.run_id.clone()));

    // Output is captured asynchronously
    let mut lines = Vec::new();
    for _ in 0..50 {
        let mut params = ObjectParams::new();
        params.insert("lines", 10).unwrap();
        let tail: Value = client
            .request("node.logs.tail.v1", params)
            .await
            .unwrap();
        lines = tail["lines"].as_array().cloned().unwrap_or_default();
        if !lines.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(lines, vec![Value::from("Starting Parity")]);

    supervisor.kill();
    assert!(supervisor.wait_for_exit(Duration::from_secs(10)).await);

    let health: Value = client.request("node.health.v1", rpc_params![]).await.unwrap();
    assert_eq!(health["running"], false);

    server.stop().unwrap();
}
