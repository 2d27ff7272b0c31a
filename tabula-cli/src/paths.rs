//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "tabula";
const APPLICATION: &str = "tabula";

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory, where logs go.
///
/// - Linux: `$XDG_CACHE_HOME/tabula` or `~/.cache/tabula`
/// - macOS: `~/Library/Caches/dev.tabula.tabula`
/// - Windows: `C:\Users\<User>\AppData\Local\tabula\tabula\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the config directory for configuration files.
///
/// - Linux: `$XDG_CONFIG_HOME/tabula` or `~/.config/tabula`
/// - macOS: `~/Library/Application Support/dev.tabula.tabula`
/// - Windows: `C:\Users\<User>\AppData\Roaming\tabula\tabula\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default table config file.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

/// Get the path to the latest log file, creating its directory.
///
/// The previous run's log is kept as `previous.log`.
pub fn log_file() -> Option<PathBuf> {
    let cache = cache_dir()?;
    fs::create_dir_all(&cache).ok()?;
    let latest = cache.join("latest.log");
    if latest.exists() {
        let _ = fs::rename(&latest, cache.join("previous.log"));
    }
    Some(latest)
}
