//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir:
//!   Windows: %APPDATA%\speakeasy\
//!   macOS:   ~/Library/Application Support/speakeasy/
//!   Linux:   ~/.config/speakeasy/

use std::path::PathBuf;

/// Resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "speakeasy";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory when the platform has no config dir.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_in_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with("speakeasy"));
        assert_eq!(paths.settings_file.parent(), Some(paths.config_dir.as_path()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }
}
