// Application Layer - Print orchestration use cases

pub mod commands;
pub mod extension;
pub mod printers;
pub mod worker;

// Re-exports
pub use extension::{
    ExtensionDeps, PrintExtension, PrintTicket, PulseOutcome, PULSE_PRINT, PULSE_REFRESH_PRINTERS,
};
pub use printers::PrinterDirectory;
pub use worker::{PrintOutcome, PrintWorker, SubmissionStatus, WorkerConfig};
