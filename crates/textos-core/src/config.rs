//! Application settings.
//!
//! Settings live in a JSON file. Every field has a default and missing fields fall back to it,
//! so an older or hand-edited file still loads.

use crate::document::CharCountRule;
use crate::formatting::FormattingSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_ENV: &str = "TEXTOS_CONFIG";
/// Settings file name used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_FILE: &str = "textos-settings.json";

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the system.
    #[default]
    System,
    /// Always light.
    Light,
    /// Always dark.
    Dark,
}

/// A theme after resolving [`Theme::System`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    /// Light colors.
    Light,
    /// Dark colors.
    Dark,
}

impl Theme {
    /// Resolve against the system's dark-mode preference.
    pub fn resolve(self, system_dark: bool) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::System if system_dark => ResolvedTheme::Dark,
            Self::System => ResolvedTheme::Light,
        }
    }

    /// Flip between light and dark (system resolves first).
    pub fn toggled(self, system_dark: bool) -> Self {
        match self.resolve(system_dark) {
            ResolvedTheme::Light => Self::Dark,
            ResolvedTheme::Dark => Self::Light,
        }
    }
}

/// Which view a document opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Paginated A4 page view.
    #[default]
    PageView,
    /// Continuous editor.
    Editor,
    /// Read-only rendered document.
    Preview,
}

impl ViewMode {
    /// The next mode in the cycle page view, editor, preview.
    pub fn toggled(self) -> Self {
        match self {
            Self::PageView => Self::Editor,
            Self::Editor => Self::Preview,
            Self::Preview => Self::PageView,
        }
    }

    /// Whether edits are accepted in this mode.
    pub fn is_editable(self) -> bool {
        !matches!(self, Self::Preview)
    }
}

/// Errors produced while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for [`AppSettings`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// Theme preference.
    pub theme: Theme,
    /// View a document opens in.
    pub default_view: ViewMode,
    /// Document formatting.
    pub formatting: FormattingSettings,
    /// Status bar character count rule.
    pub char_count_rule: CharCountRule,
    /// Last file opened, if any.
    pub last_opened_file: Option<PathBuf>,
}

impl AppSettings {
    /// Settings file location: `$TEXTOS_CONFIG`, else `textos-settings.json` in the working
    /// directory.
    pub fn default_path() -> PathBuf {
        env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path`, falling back to defaults if it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load settings, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save settings to `path` as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
