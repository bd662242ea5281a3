// Worker constants (no magic values)
use std::time::Duration;

/// Delay between submission and temp-file deletion (2s)
/// Gives the OS tool time to open the file before it disappears
pub const CLEANUP_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for `lpstat` / `wmic` / PowerShell printer queries (10s)
pub const ENUMERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Temporary image file name prefix
pub const TEMP_FILE_PREFIX: &str = "frameprint_";

/// Temporary image file extension (the host always exports PNG)
pub const TEMP_FILE_SUFFIX: &str = ".png";
