// Fether Infrastructure - System Adapters
// Implements: ProcessSpawner, LogStore, BinaryLocator, Acquirer, ProcessInspector

pub mod binary_locator;
pub mod command_acquirer;
pub mod file_log_store;
pub mod process_inspector_impl;
pub mod process_spawner;

pub use binary_locator::FsBinaryLocator;
pub use command_acquirer::CommandAcquirer;
pub use file_log_store::FileLogStore;
pub use process_inspector_impl::SysinfoProcessInspector;
pub use process_spawner::TokioProcessSpawner;
