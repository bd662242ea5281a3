// Print Job Domain Model

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use super::error::DomainError;

/// Job ID (UUID v4)
pub type JobId = String;

/// Copy count, never below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Copies(u32);

impl Copies {
    pub const ONE: Copies = Copies(1);

    /// Clamp any host-supplied integer into a valid copy count.
    ///
    /// ```text
    /// Copies::clamped(0).get()  == 1
    /// Copies::clamped(-4).get() == 1
    /// Copies::clamped(3).get()  == 3
    /// ```
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(1, i64::from(u32::MAX)) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Copies {
    fn default() -> Self {
        Self::ONE
    }
}

/// Page orientation requested for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Leave orientation to the printer driver
    #[default]
    Auto,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Auto => "auto",
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Lenient parse used for host parameter values.
    /// Unrecognized values fall back to `Auto` with a warning.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|e: DomainError| {
            warn!(value = %raw, error = %e, "Unrecognized orientation, using auto");
            Orientation::Auto
        })
    }

    /// True when the job asks for a specific orientation
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Orientation::Auto)
    }
}

impl FromStr for Orientation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Orientation::Auto),
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(DomainError::InvalidOrientation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective scaling mode derived from the fit/fill flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Fill the page, cropping if needed
    Fill,
    /// Fit the whole image on the page
    Fit,
    /// No scaling option; printer default applies
    PrinterDefault,
}

/// Parameters for a single print request.
///
/// Built fresh from host parameters on every `Print` pulse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobRequest {
    /// Target printer; `None` means the OS default
    pub printer: Option<String>,
    pub copies: Copies,
    pub fit_to_page: bool,
    /// Takes precedence over `fit_to_page`
    pub fill_to_page: bool,
    pub orientation: Orientation,
    /// Emit per-job diagnostics (command lines, tool output)
    pub debug: bool,
}

impl Default for PrintJobRequest {
    fn default() -> Self {
        Self {
            printer: None,
            copies: Copies::ONE,
            fit_to_page: true,
            fill_to_page: false,
            orientation: Orientation::Auto,
            debug: true,
        }
    }
}

impl PrintJobRequest {
    pub fn scaling(&self) -> Scaling {
        if self.fill_to_page {
            Scaling::Fill
        } else if self.fit_to_page {
            Scaling::Fit
        } else {
            Scaling::PrinterDefault
        }
    }

    pub fn printer(&self) -> Option<&str> {
        self.printer.as_deref()
    }
}

/// A request bound to the exported image it prints.
///
/// The job owns `image_path` exclusively; the worker deletes it after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub image_path: PathBuf,
    pub request: PrintJobRequest,
}

impl PrintJob {
    pub fn new(id: impl Into<JobId>, image_path: impl Into<PathBuf>, request: PrintJobRequest) -> Self {
        Self {
            id: id.into(),
            image_path: image_path.into(),
            request,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Whether per-job diagnostics are enabled
    pub fn verbose(&self) -> bool {
        self.request.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_clamp_to_one() {
        assert_eq!(Copies::clamped(0).get(), 1);
        assert_eq!(Copies::clamped(-7).get(), 1);
        assert_eq!(Copies::clamped(1).get(), 1);
        assert_eq!(Copies::clamped(5).get(), 5);
        assert_eq!(Copies::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!("landscape".parse::<Orientation>().unwrap(), Orientation::Landscape);
        assert_eq!("  Portrait ".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!("AUTO".parse::<Orientation>().unwrap(), Orientation::Auto);
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_orientation_normalize_unknown_to_auto() {
        assert_eq!(Orientation::normalize("sideways"), Orientation::Auto);
        assert_eq!(Orientation::normalize(""), Orientation::Auto);
        assert_eq!(Orientation::normalize("Landscape"), Orientation::Landscape);
    }

    #[test]
    fn test_fill_takes_precedence_over_fit() {
        let request = PrintJobRequest {
            fit_to_page: true,
            fill_to_page: true,
            ..Default::default()
        };
        assert_eq!(request.scaling(), Scaling::Fill);

        let request = PrintJobRequest {
            fit_to_page: false,
            fill_to_page: false,
            ..Default::default()
        };
        assert_eq!(request.scaling(), Scaling::PrinterDefault);
    }

    #[test]
    fn test_request_defaults() {
        let request = PrintJobRequest::default();
        assert_eq!(request.printer(), None);
        assert_eq!(request.copies, Copies::ONE);
        assert_eq!(request.scaling(), Scaling::Fit);
        assert_eq!(request.orientation, Orientation::Auto);
        assert!(request.debug);
    }
}
