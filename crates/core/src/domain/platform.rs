// Platform selection for print submission

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::DomainError;

/// OS family that decides which print tools are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// CUPS via `lp` / `lpstat`
    MacOs,
    /// `mspaint` with Photo Viewer fallback, `wmic` / PowerShell enumeration
    Windows,
    /// Any other OS; uses the CUPS tools like macOS
    Posix,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (`std::env::consts::OS` style) to a platform.
    /// Unknown identifiers map to `Posix`.
    pub fn from_os(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Posix,
        }
    }

    pub fn uses_cups(&self) -> bool {
        matches!(self, Platform::MacOs | Platform::Posix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Posix => "posix",
        }
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "posix" | "linux" => Ok(Platform::Posix),
            _ => Err(DomainError::InvalidPlatform(s.to_string())),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
