//! RPC Method Handlers
//!
//! Every method is a read of supervisor state; none of them can start or
//! stop the node.

use crate::error::{to_rpc_error, validation_error};
use crate::types::{
    HealthResponse, StatusResponse, TailLogsRequest, TailLogsResponse, MAX_TAIL_LINES,
};
use fether_core::port::{LogStore, ProcessInspector};
use fether_core::{NodeSupervisor, SupervisorError};
use jsonrpsee::types::ErrorObjectOwned;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    supervisor: Arc<NodeSupervisor>,
    inspector: Arc<dyn ProcessInspector>,
    log_store: Arc<dyn LogStore>,
}

impl RpcHandler {
    pub fn new(
        supervisor: Arc<NodeSupervisor>,
        inspector: Arc<dyn ProcessInspector>,
        log_store: Arc<dyn LogStore>,
    ) -> Self {
        Self {
            supervisor,
            inspector,
            log_store,
        }
    }

    /// node.status.v1
    pub async fn status(&self) -> Result<StatusResponse, ErrorObjectOwned> {
        let snapshot = self.supervisor.snapshot();

        let metrics = match snapshot.pid {
            Some(pid) if snapshot.running => self.inspector.sample(pid),
            _ => None,
        };

        Ok(StatusResponse {
            running: snapshot.running,
            state: snapshot.state,
            pid: snapshot.pid,
            run_id: snapshot.run_id,
            started_at: snapshot.started_at,
            args: snapshot.args,
            log_path: snapshot.log_path,
            last_exit: snapshot.last_exit,
            last_error: snapshot.last_error,
            memory_mb: metrics.as_ref().map(|m| m.memory_mb),
            cpu_percent: metrics.as_ref().map(|m| m.cpu_percent),
        })
    }

    /// node.logs.tail.v1
    pub async fn tail_logs(
        &self,
        params: TailLogsRequest,
    ) -> Result<TailLogsResponse, ErrorObjectOwned> {
        if params.lines == 0 || params.lines > MAX_TAIL_LINES {
            return Err(validation_error(format!(
                "lines must be between 1 and {}",
                MAX_TAIL_LINES
            )));
        }

        let content = match self.log_store.read_all() {
            Ok(content) => content,
            // No launch yet
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(to_rpc_error(SupervisorError::Io(e))),
        };

        let all_lines: Vec<&str> = content.lines().collect();
        let start = all_lines.len().saturating_sub(params.lines);
        let lines: Vec<String> = all_lines[start..].iter().map(|s| s.to_string()).collect();

        debug!(requested = %params.lines, returned = %lines.len(), "Log tail served");

        Ok(TailLogsResponse {
            log_path: self.log_store.location(),
            lines,
        })
    }

    /// node.health.v1
    pub async fn health(&self) -> Result<HealthResponse, ErrorObjectOwned> {
        Ok(HealthResponse {
            running: self.supervisor.is_running(),
        })
    }
}
