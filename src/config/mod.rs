//! Editor configuration
//!
//! Preferences are a flat key/value record the host persists however it likes
//! (the browser build keeps them in local storage as JSON). They are handed to
//! the document once, at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid preferences JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// User preferences; every missing field falls back to its default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorPreferences {
    pub auto_play: bool,
    pub auto_follow: bool,
    pub show_fifth: bool,
    pub show_letters: bool,
    pub show_channels: bool,
    pub show_scroll_bar: bool,
    pub always_show_settings: bool,
    pub enable_note_preview: bool,
    /// 0..=100
    pub volume: u8,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            auto_play: false,
            auto_follow: true,
            show_fifth: false,
            show_letters: false,
            show_channels: false,
            show_scroll_bar: false,
            always_show_settings: true,
            enable_note_preview: true,
            volume: 75,
        }
    }
}

impl EditorPreferences {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut prefs: EditorPreferences = serde_json::from_str(json)?;
        prefs.volume = prefs.volume.min(100);
        Ok(prefs)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the document needs at construction
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    pub preferences: EditorPreferences,
    /// Encoded song used when the navigation stack has no address yet
    pub initial_song: Option<String>,
}

impl DocumentConfig {
    pub fn with_preferences(preferences: EditorPreferences) -> Self {
        Self {
            preferences,
            initial_song: None,
        }
    }
}
