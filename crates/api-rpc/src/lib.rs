//! JSON-RPC API Layer
//!
//! Read-only status surface over the node supervisor, bound to localhost.
//! Methods are versioned (`node.*.v1`).

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
