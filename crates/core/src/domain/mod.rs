// Domain Layer - Print jobs, printers, platforms and command lines

pub mod command;
pub mod error;
pub mod job;
pub mod platform;
pub mod printer;

// Re-exports
pub use command::CommandLine;
pub use error::DomainError;
pub use job::{Copies, JobId, Orientation, PrintJob, PrintJobRequest, Scaling};
pub use platform::Platform;
pub use printer::{resolve_printer, PrinterList, REFRESH_SENTINEL};
