//! RPC Request/Response Types

use fether_core::domain::{ExitStatusInfo, ProcessState};
use serde::{Deserialize, Serialize};

/// Upper bound for `node.logs.tail.v1`
pub const MAX_TAIL_LINES: usize = 10_000;

/// node.status.v1 - Supervisor snapshot plus live resource usage
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub state: ProcessState,
    pub pid: Option<u32>,
    pub run_id: Option<String>,
    pub started_at: Option<i64>,
    pub args: Vec<String>,
    pub log_path: String,
    pub last_exit: Option<ExitStatusInfo>,
    pub last_error: Option<String>,
    pub memory_mb: Option<u64>,
    pub cpu_percent: Option<f32>,
}

/// node.logs.tail.v1 - Tail the node log
#[derive(Debug, Deserialize)]
pub struct TailLogsRequest {
    #[serde(default = "default_lines")]
    pub lines: usize,
}

fn default_lines() -> usize {
    50
}

impl Default for TailLogsRequest {
    fn default() -> Self {
        Self {
            lines: default_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TailLogsResponse {
    pub log_path: String,
    pub lines: Vec<String>,
}

/// node.health.v1 - The simplified running signal
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub running: bool,
}
