//! Command builders - pure mapping from a print request to OS tool invocations
//!
//! - CUPS (macOS / POSIX): `lp`, `lpstat -p`
//! - Windows: `mspaint /pt`, Photo Viewer via `rundll32`, `wmic` / PowerShell

use crate::domain::{CommandLine, Orientation, PrintJobRequest, Scaling};
use std::path::{Path, PathBuf};

const PHOTO_VIEWER_ENTRY: &str = "ImageView_PrintTo";
const DEFAULT_PROGRAM_FILES: &str = r"C:\Program Files";
const DEFAULT_PROGRAM_FILES_X86: &str = r"C:\Program Files (x86)";

/// `lp [-d printer] [-n copies] [-o scaling] [-o orientation] <file>`
pub fn lp_command(image: &Path, request: &PrintJobRequest) -> CommandLine {
    let mut cmd = CommandLine::new("lp");

    if let Some(printer) = request.printer() {
        cmd = cmd.args(["-d", printer]);
    }
    if request.copies.get() > 1 {
        cmd = cmd.args(["-n".to_string(), request.copies.get().to_string()]);
    }

    cmd = match request.scaling() {
        Scaling::Fill => cmd.args(["-o", "print-scaling=fill"]),
        Scaling::Fit => cmd.args(["-o", "fit-to-page"]),
        Scaling::PrinterDefault => cmd,
    };

    cmd = match request.orientation {
        Orientation::Landscape => cmd.args(["-o", "landscape"]),
        Orientation::Portrait => cmd.args(["-o", "landscape=false"]),
        Orientation::Auto => cmd,
    };

    cmd.arg(path_arg(image))
}

/// `mspaint.exe /pt <file> [printer]`
pub fn mspaint_command(image: &Path, printer: Option<&str>) -> CommandLine {
    let cmd = CommandLine::new("mspaint.exe").args(["/pt".to_string(), path_arg(image)]);
    match printer {
        Some(printer) => cmd.arg(printer),
        None => cmd,
    }
}

/// `rundll32.exe "<PhotoViewer.dll>,ImageView_PrintTo" <file> [printer]`
pub fn photo_viewer_command(dll: &Path, image: &Path, printer: Option<&str>) -> CommandLine {
    let entry = format!("{},{}", dll.display(), PHOTO_VIEWER_ENTRY);
    let cmd = CommandLine::new("rundll32.exe").args([entry, path_arg(image)]);
    match printer {
        Some(printer) => cmd.arg(printer),
        None => cmd,
    }
}

/// Pick the Photo Viewer DLL: the first candidate that exists, else the first candidate.
///
/// # Arguments
/// * `program_files` - value of `%ProgramFiles%`, if set
/// * `program_files_x86` - value of `%ProgramFiles(x86)%`, if set
/// * `exists` - existence check (injected for tests)
pub fn resolve_photo_viewer_dll(
    program_files: Option<&str>,
    program_files_x86: Option<&str>,
    exists: impl Fn(&Path) -> bool,
) -> PathBuf {
    let candidates = [
        photo_viewer_candidate(program_files.unwrap_or(DEFAULT_PROGRAM_FILES)),
        photo_viewer_candidate(program_files_x86.unwrap_or(DEFAULT_PROGRAM_FILES_X86)),
    ];
    candidates
        .iter()
        .find(|p| exists(p))
        .unwrap_or(&candidates[0])
        .clone()
}

/// Photo Viewer DLL for the running process's environment
pub fn default_photo_viewer_dll() -> PathBuf {
    let program_files = std::env::var("ProgramFiles").ok();
    let program_files_x86 = std::env::var("ProgramFiles(x86)").ok();
    resolve_photo_viewer_dll(
        program_files.as_deref(),
        program_files_x86.as_deref(),
        Path::exists,
    )
}

// Backslash-joined so the path is valid on the Windows target regardless of build host
fn photo_viewer_candidate(root: &str) -> PathBuf {
    PathBuf::from(format!(
        r"{}\Windows Photo Viewer\PhotoViewer.dll",
        root.trim_end_matches('\\')
    ))
}

/// `lpstat -p`
pub fn lpstat_command() -> CommandLine {
    CommandLine::new("lpstat").arg("-p")
}

/// `wmic printer get name`
pub fn wmic_printers_command() -> CommandLine {
    CommandLine::new("wmic").args(["printer", "get", "name"])
}

/// `powershell -Command "Get-Printer | Select-Object -ExpandProperty Name"`
pub fn powershell_printers_command() -> CommandLine {
    CommandLine::new("powershell").args([
        "-Command",
        "Get-Printer | Select-Object -ExpandProperty Name",
    ])
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
