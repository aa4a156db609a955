// Process inspector implementation
// reason: sysinfo for cross-platform per-process metrics
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, System};
use tracing::debug;

use fether_core::port::process_inspector::{ProcessMetrics, ProcessInspector};

/// Samples the node process with sysinfo
///
/// CPU usage is computed between two refreshes, so the first sample of a
/// pid reads 0%.
pub struct SysinfoProcessInspector {
    system: Mutex<System>,
}

impl SysinfoProcessInspector {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProcessInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInspector for SysinfoProcessInspector {
    fn sample(&self, pid: u32) -> Option<ProcessMetrics> {
        let mut sys = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        let pid = Pid::from_u32(pid);

        if !sys.refresh_process(pid) {
            return None;
        }

        let process = sys.process(pid)?;
        let metrics = ProcessMetrics {
            memory_mb: process.memory() / 1024 / 1024,
            cpu_percent: process.cpu_usage(),
        };

        debug!(
            pid = %pid,
            memory_mb = %metrics.memory_mb,
            cpu = %metrics.cpu_percent,
            "Process metrics collected"
        );
        Some(metrics)
    }
}
