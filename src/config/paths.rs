//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\word-picker\
//!   macOS:   ~/Library/Application Support/word-picker/
//!   Linux:   ~/.config/word-picker/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "word-picker";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
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

    /// Directory the file picker opens in when no start directory is
    /// configured.
    pub fn default_sheet_dir() -> Option<PathBuf> {
        dirs::document_dir().or_else(dirs::home_dir)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
