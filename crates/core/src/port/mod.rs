// Port Layer - Interfaces for the host and the OS

pub mod command_runner;
pub mod host;
pub mod id_provider; // For deterministic testing
pub mod temp_store;
pub mod time_provider;

// Re-exports
pub use command_runner::{CommandOutput, CommandRunner, ExecutionError, ExecutionStatus};
pub use host::{FrameInfo, FrameSource, HostError, HostParameters};
pub use id_provider::IdProvider;
pub use temp_store::TempStore;
pub use time_provider::TimeProvider;
