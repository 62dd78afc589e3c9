//! Application settings structs, defaults and TOML loading.
//!
//! The settings file is optional and only read at startup; the application
//! never writes it.  Every section and field has a default, so a partial
//! file is fine.
//!
//! ```toml
//! [speech]
//! voice = "Samantha"
//! rate_wpm = 150
//!
//! [sheet]
//! start_dir = "/home/me/lists"
//! worksheet = "Week 3"
//!
//! [ui]
//! window_size = [400.0, 400.0]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::AppPaths;
use crate::speech::{clamp_wpm, DEFAULT_RATE_WPM};

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Startup values for the voice picker and the rate slider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Voice id or display name to preselect.  `None` keeps the engine
    /// default.
    pub voice: Option<String>,
    /// Initial speech rate in words per minute (clamped to 100 – 300).
    pub rate_wpm: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: None,
            rate_wpm: DEFAULT_RATE_WPM,
        }
    }
}

// ---------------------------------------------------------------------------
// SheetConfig
// ---------------------------------------------------------------------------

/// How word sheets are located and read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Directory the file picker opens in.
    pub start_dir: Option<PathBuf>,
    /// Worksheet to read; `None` reads the first one.
    pub worksheet: Option<String>,
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window and text sizes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size in logical pixels.
    pub window_size: (f32, f32),
    /// Point size of the current-word label.
    pub word_font_size: f32,
    /// Point size of the log entries.
    pub log_font_size: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (400.0, 400.0),
            word_font_size: 16.0,
            log_font_size: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, read from `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub speech: SpeechConfig,
    pub sheet: SheetConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.speech.rate_wpm = clamp_wpm(config.speech.rate_wpm);
        Ok(config)
    }

    /// Directory for the file picker: configured, else documents/home.
    pub fn sheet_dir(&self) -> Option<PathBuf> {
        self.sheet
            .start_dir
            .clone()
            .or_else(AppPaths::default_sheet_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.speech.rate_wpm, 100);
        assert!(cfg.speech.voice.is_none());
        assert!(cfg.sheet.worksheet.is_none());
        assert_eq!(cfg.ui.window_size, (400.0, 400.0));
        assert_eq!(cfg.ui.word_font_size, 16.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[speech]\nvoice = \"Daniel\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.speech.voice.as_deref(), Some("Daniel"));
        assert_eq!(cfg.speech.rate_wpm, DEFAULT_RATE_WPM);
        assert_eq!(cfg.ui, UiConfig::default());
    }

    #[test]
    fn full_file_overrides_everything() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[speech]
rate_wpm = 180

[sheet]
start_dir = "/tmp/lists"
worksheet = "Week 3"

[ui]
window_size = [500.0, 600.0]
word_font_size = 24.0
log_font_size = 12.0
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.speech.rate_wpm, 180);
        assert_eq!(cfg.sheet.start_dir, Some(PathBuf::from("/tmp/lists")));
        assert_eq!(cfg.sheet.worksheet.as_deref(), Some("Week 3"));
        assert_eq!(cfg.ui.window_size, (500.0, 600.0));
        assert_eq!(cfg.sheet_dir(), Some(PathBuf::from("/tmp/lists")));
    }

    #[test]
    fn out_of_range_rate_is_clamped() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[speech]\nrate_wpm = 1000\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.speech.rate_wpm, 300);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[speech\nrate_wpm = ").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
