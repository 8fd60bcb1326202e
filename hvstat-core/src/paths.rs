//! Centralized path configuration for hvstat.

use std::path::PathBuf;

/// Get the configuration file path.
///
/// Resolution order:
/// 1. `HVSTAT_CONFIG` environment variable
/// 2. `<config dir>/hvstat/config.json` (e.g. `~/.config/hvstat/config.json`)
/// 3. `/etc/hvstat/config.json` when no user config dir exists
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("HVSTAT_CONFIG") {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .map(|dir| dir.join("hvstat"))
        .unwrap_or_else(|| PathBuf::from("/etc/hvstat"))
        .join("config.json")
}
