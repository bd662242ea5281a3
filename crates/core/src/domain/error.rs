// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid orientation: {0:?} (expected auto, portrait or landscape)")]
    InvalidOrientation(String),

    #[error("Invalid platform: {0:?}")]
    InvalidPlatform(String),
}
