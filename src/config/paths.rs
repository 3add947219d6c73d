//! Platform-appropriate data directories for the practice app.

use std::path::PathBuf;

/// Resolved filesystem locations used by the application.
///
/// All paths live under the platform config directory
/// (`~/.config/chinese-practice` on Linux, `~/Library/Application
/// Support/chinese-practice` on macOS, `%APPDATA%\chinese-practice` on
/// Windows).  Falls back to the current directory when the platform
/// directory cannot be determined.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Root configuration directory.
    pub config_dir: PathBuf,
    /// Path of `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Resolve the application paths for the current platform.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chinese-practice");
        let settings_file = config_dir.join("settings.toml");
        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
