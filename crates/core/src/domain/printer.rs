// Printer list model

use serde::{Deserialize, Serialize};

/// Non-printer entry always shown first in the printer selector
pub const REFRESH_SENTINEL: &str = "(refresh)";

/// Printers discovered from the OS, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterList {
    printers: Vec<String>,
}

impl PrinterList {
    pub fn new(printers: Vec<String>) -> Self {
        Self { printers }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Real printers only (no sentinel)
    pub fn detected(&self) -> &[String] {
        &self.printers
    }

    pub fn first(&self) -> Option<&str> {
        self.printers.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    /// Selector entries: the sentinel followed by every detected printer
    pub fn menu(&self) -> Vec<String> {
        std::iter::once(REFRESH_SENTINEL.to_string())
            .chain(self.printers.iter().cloned())
            .collect()
    }
}

/// Pick the printer for a job.
///
/// A selector value that is neither empty nor the sentinel wins over the typed name.
/// An empty result means the OS default printer.
pub fn resolve_printer(typed: Option<&str>, selected: Option<&str>) -> Option<String> {
    let selected = selected
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != REFRESH_SENTINEL);

    selected
        .or_else(|| typed.map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}
