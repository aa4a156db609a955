//! JSON-RPC Server
//!
//! Plain HTTP JSON-RPC 2.0 on the loopback interface only.

use crate::handler::RpcHandler;
use crate::types::TailLogsRequest;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9528;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("node.status.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.status().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("node.logs.tail.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: Option<TailLogsRequest> = params.parse()?;
                    handler.tail_logs(req.unwrap_or_default()).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("node.health.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.health().await }
            })
            .map_err(|e| e.to_string())?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (port 0 picks a free port) and the handle
    /// used to stop it.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC status server (localhost only)"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC status server started");
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fether_core::port::binary::mocks::{FixedLocator, MockAcquirer};
    use fether_core::port::error_sink::mocks::RecordingErrorSink;
    use fether_core::port::host::mocks::RecordingHost;
    use fether_core::port::id_provider::mocks::SequentialIdProvider;
    use fether_core::port::log_sink::mocks::MemoryLogStore;
    use fether_core::port::process::mocks::FakeSpawner;
    use fether_core::port::process_inspector::mocks::StaticInspector;
    use fether_core::port::time_provider::mocks::FixedTimeProvider;
    use fether_core::{NodeSupervisor, SupervisorPorts};
    use jsonrpsee::rpc_params;
    use serde_json::Value;

    fn server() -> RpcServer {
        let logs = MemoryLogStore::new();
        let locator = Arc::new(FixedLocator::present("/usr/bin/parity"));
        let supervisor = Arc::new(NodeSupervisor::new(SupervisorPorts {
            locator: locator.clone(),
            acquirer: Arc::new(MockAcquirer::installing("/usr/bin/parity", locator)),
            spawner: Arc::new(FakeSpawner::new()),
            log_store: Arc::new(logs.clone()),
            error_sink: Arc::new(RecordingErrorSink::new()),
            host: Arc::new(RecordingHost::new()),
            id_provider: Arc::new(SequentialIdProvider::new()),
            time_provider: Arc::new(FixedTimeProvider::new(1_000)),
        }));
        let handler = RpcHandler::new(supervisor, Arc::new(StaticInspector::empty()), Arc::new(logs));
        RpcServer::new(RpcServerConfig::default(), handler)
    }

    #[test]
    fn test_default_config_is_loopback() {
        let config = RpcServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9528);
    }

    #[tokio::test]
    async fn test_methods_registered() {
        let module = server().module().unwrap();
        let mut names: Vec<_> = module.method_names().collect();
        names.sort();

        assert_eq!(
            names,
            vec!["node.health.v1", "node.logs.tail.v1", "node.status.v1"]
        );
    }

    #[tokio::test]
    async fn test_health_call() {
        let module = server().module().unwrap();

        let health: Value = module.call("node.health.v1", rpc_params![]).await.unwrap();

        assert_eq!(health["running"], Value::Bool(false));
    }

    #[tokio::test]
    async fn test_status_call_serializes_state() {
        let module = server().module().unwrap();

        let status: Value = module.call("node.status.v1", rpc_params![]).await.unwrap();

        assert_eq!(status["state"], "NOT_STARTED");
        assert_eq!(status["pid"], Value::Null);
        assert_eq!(status["log_path"], "memory://parity.log");
    }

    #[tokio::test]
    async fn test_tail_call_without_params() {
        let module = server().module().unwrap();

        let tail: Value = module
            .call("node.logs.tail.v1", rpc_params![])
            .await
            .unwrap();

        assert_eq!(tail["lines"], Value::Array(vec![]));
    }
}
