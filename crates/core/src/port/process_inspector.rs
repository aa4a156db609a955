// Process resource inspector port
// Feeds resource usage of the node pid into the status surface

/// Resource usage of a single process
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMetrics {
    pub memory_mb: u64,
    pub cpu_percent: f32,
}

/// Samples a process by pid
pub trait ProcessInspector: Send + Sync {
    /// None if the process is gone
    fn sample(&self, pid: u32) -> Option<ProcessMetrics>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Inspector returning fixed metrics for any pid
    pub struct StaticInspector {
        metrics: Option<ProcessMetrics>,
    }

    impl StaticInspector {
        pub fn new(memory_mb: u64, cpu_percent: f32) -> Self {
            Self {
                metrics: Some(ProcessMetrics {
                    memory_mb,
                    cpu_percent,
                }),
            }
        }

        pub fn empty() -> Self {
            Self { metrics: None }
        }
    }

    impl ProcessInspector for StaticInspector {
        fn sample(&self, _pid: u32) -> Option<ProcessMetrics> {
            self.metrics.clone()
        }
    }
}
