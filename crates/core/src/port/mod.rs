// Port Layer - Interfaces for external dependencies

pub mod binary;
pub mod error_sink;
pub mod host;
pub mod id_provider; // For deterministic testing
pub mod log_sink;
pub mod process;
pub mod process_inspector;
pub mod time_provider;

// Re-exports
pub use binary::{Acquirer, AcquisitionError, BinaryLocator};
pub use error_sink::ErrorSink;
pub use host::HostControl;
pub use id_provider::IdProvider;
pub use log_sink::{LogSink, LogStore};
pub use process::{
    OutputStream, ProcessControl, ProcessEvent, ProcessSpawner, SpawnError, SpawnedProcess,
};
pub use process_inspector::{ProcessMetrics, ProcessInspector};
pub use time_provider::TimeProvider;
