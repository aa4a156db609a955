// Application Layer - Supervision use cases

pub mod constants;
pub mod log_capture;
pub mod presence;
pub mod supervisor;

// Re-exports
pub use log_capture::LogCapture;
pub use presence::BinaryGate;
pub use supervisor::{NodeSupervisor, RunningHandle, SupervisorPorts, SupervisorSnapshot};
