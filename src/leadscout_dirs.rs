//! Centralized application directory paths for Leadscout.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/leadscout/` | `~/.local/share/leadscout/` |
//! | Config | `~/Library/Application Support/leadscout/` | `~/.config/leadscout/` |
//!
//! # Environment Overrides
//!
//! - `LEADSCOUT_DATA_DIR` overrides [`data_dir`]
//! - `LEADSCOUT_CONFIG_DIR` overrides [`config_dir`]

use std::ffi::OsString;
use std::path::PathBuf;

/// Application data root directory (the executive database lives here).
///
/// Resolves to `dirs::data_dir()/leadscout/` by default. Override with
/// the `LEADSCOUT_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("LEADSCOUT_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/leadscout-data",
    )
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/leadscout/` by default. Override with
/// the `LEADSCOUT_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("LEADSCOUT_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/leadscout-config",
    )
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default executive database path (`data_dir()/leadscout.db`).
#[must_use]
pub fn database_file() -> PathBuf {
    data_dir().join("leadscout.db")
}

fn resolve(override_dir: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform
        .map(|d| d.join("leadscout"))
        .unwrap_or_else(|| PathBuf::from(fallback))
}
