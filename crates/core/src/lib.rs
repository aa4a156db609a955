// Fether Core - Node supervision logic & ports
// NO process spawning, NO filesystem, NO RPC (those live in infra crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{NodeSupervisor, RunningHandle, SupervisorPorts, SupervisorSnapshot};
pub use error::{Result, SupervisorError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
