//! Player settings and preferences
//!
//! Persisted as JSON, separately from high scores.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration values the tracker reads
pub trait Config {
    /// Allow playing locked levels
    fn cheat(&self) -> bool;
    /// Keep goals enabled on levels that were already completed
    fn lock_goals(&self) -> bool;
    /// Name recorded in leaderboards and replays
    fn player(&self) -> &str;
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Player name for high scores
    pub player: String,

    // === Gameplay ===
    /// Unlock every level
    pub cheat: bool,
    /// Require the goal even on completed levels
    pub lock_goals: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player: "Player".to_string(),

            cheat: false,
            lock_goals: false,

            master_volume: 0.8,
            music_volume: 0.7,
        }
    }
}

impl Settings {
    /// Effective music volume (master scaled)
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring corrupt settings {}: {}", path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to read settings {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

impl Config for Settings {
    fn cheat(&self) -> bool {
        self.cheat
    }

    fn lock_goals(&self) -> bool {
        self.lock_goals
    }

    fn player(&self) -> &str {
        &self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.player(), "Player");
        assert!(!settings.cheat());
        assert!(!settings.lock_goals());
        assert!((settings.effective_music_volume() - 0.56).abs() < 0.0001);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "player": "Ann", "lock_goals": true }"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.player, "Ann");
        assert!(settings.lock_goals);
        assert!(!settings.cheat);
        assert_eq!(settings.music_volume, 0.7);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(&path).player, "Player");
        assert_eq!(Settings::load(&dir.path().join("absent.json")).player, "Player");
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            player: "Bob".to_string(),
            cheat: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.player, "Bob");
        assert!(loaded.cheat);
    }
}
