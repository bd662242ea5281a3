// frameprint Infrastructure - OS Adapters
// Implements: CommandRunner, TempStore

pub mod subprocess_runner;
pub mod temp_store_impl;

pub use subprocess_runner::SubprocessRunner;
pub use temp_store_impl::FsTempStore;
