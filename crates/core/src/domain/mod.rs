// Domain Layer - Pure supervision model

pub mod classify;
pub mod health;
pub mod node_options;
pub mod process;

// Re-exports
pub use classify::{classify_exit, is_catchable, ExitClass, CATCHABLE_ERRORS};
pub use health::HealthSignal;
pub use node_options::{derive_args, NodeOptions};
pub use process::{ExitKind, ExitStatusInfo, ProcessState};
