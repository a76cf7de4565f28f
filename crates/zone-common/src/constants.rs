//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Version of the container API.
pub const VERSION: &str = "1.0";

/// Application name used in CLI output.
pub const APP_NAME: &str = "zone";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "zone";

/// Default binding manifest file name.
pub const DEFAULT_MANIFEST: &str = "zone.yaml";

/// System-wide storage directory used when no home directory is available.
pub const SYSTEM_STORAGE_DIR: &str = "/var/lib/zone";

/// Sigil marking an optional dependency.
pub const OPTIONAL_SIGIL: char = '?';

/// Sigil marking a free, caller-supplied dependency.
pub const FREE_SIGIL: char = '#';

/// Separator between namespace path segments.
pub const PATH_SEPARATOR: char = '.';

/// Name of the host environment binding.
pub const HOST_BINDING: &str = "$host";

/// Name of the logging sink binding.
pub const CONSOLE_BINDING: &str = "$console";

/// Name of the persistent storage binding.
pub const STORAGE_BINDING: &str = "$storage";

/// Name of the background worker constructor binding.
pub const WORKER_BINDING: &str = "$Worker";

/// Returns the storage directory, preferring `$HOME/.zone` and falling back
/// to [`SYSTEM_STORAGE_DIR`].
fn resolve_storage_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(
            |_| PathBuf::from(SYSTEM_STORAGE_DIR),
            |home| PathBuf::from(home).join(".zone"),
        )
}

static STORAGE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved storage directory for this process.
pub fn storage_dir() -> &'static PathBuf {
    STORAGE_DIR.get_or_init(resolve_storage_dir)
}
