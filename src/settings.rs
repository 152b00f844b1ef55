//! Player preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, StorageError};

/// How the player steers their musician
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Thumbstick in the bottom-right corner
    #[default]
    Joystick,
    /// The musician follows the finger/cursor
    Drag,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Joystick => "Joystick",
            ControlScheme::Drag => "Drag",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "joystick" | "stick" => Some(ControlScheme::Joystick),
            "drag" | "touch" => Some(ControlScheme::Drag),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ControlScheme::Joystick => ControlScheme::Drag,
            ControlScheme::Drag => ControlScheme::Joystick,
        }
    }
}

/// Longest name kept for a character (and the high score table)
pub const MAX_NAME_LEN: usize = 8;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background march volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Controls ===
    pub control: ControlScheme,

    // === Character ===
    /// Selected musician, also the name saved with scores
    pub character: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            sfx_volume: 1.0,
            muted: false,
            control: ControlScheme::Joystick,
            character: "JPM".to_string(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "parade_drill_settings";

    /// Effective music gain (respects mute)
    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume.clamp(0.0, 1.0) }
    }

    /// Effective cue gain (respects mute)
    pub fn sfx_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume.clamp(0.0, 1.0) }
    }

    /// Name shown on the score table for the selected character
    pub fn player_name(&self) -> String {
        let name: String = self.character.trim().chars().take(MAX_NAME_LEN).collect();
        let name = name.trim_end();
        if name.is_empty() {
            "---".to_string()
        } else {
            name.to_uppercase()
        }
    }

    /// Load settings, falling back to defaults on any storage problem
    pub fn load() -> Self {
        match storage::load::<Settings>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        storage::save(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_scheme_parse() {
        assert_eq!(ControlScheme::parse("Drag"), Some(ControlScheme::Drag));
        assert_eq!(ControlScheme::parse("STICK"), Some(ControlScheme::Joystick));
        assert_eq!(ControlScheme::parse("mouse"), None);
        assert_eq!(ControlScheme::Drag.toggled(), ControlScheme::Joystick);
    }

    #[test]
    fn test_mute_silences_everything() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.music_gain(), 0.0);
        assert_eq!(settings.sfx_gain(), 0.0);
        assert_eq!(Settings::default().music_gain(), 0.7);
    }

    #[test]
    fn test_player_name() {
        let mut settings = Settings::default();
        settings.character = "candice du bois".to_string();
        assert_eq!(settings.player_name(), "CANDICE");
        settings.character = "  ".to_string();
        assert_eq!(settings.player_name(), "---");
    }

    #[test]
    fn test_old_settings_json_keeps_new_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "muted": true }"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.control, ControlScheme::Joystick);
        assert_eq!(settings.character, "JPM");
    }

    #[test]
    fn test_native_load_is_default() {
        assert_eq!(Settings::load(), Settings::default());
        assert!(Settings::default().save().is_ok());
    }
}
