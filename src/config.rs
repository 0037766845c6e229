//! User preferences and default file locations

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scale::SCALES;

const APP_DIR: &str = "groovepan";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Toggles remembered between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub dark_theme: bool,
    pub hand_split: bool,
    pub metronome: bool,
    pub compose: bool,
    pub presentation: bool,
    pub handpan_sounds: bool,
    pub scale: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_theme: false,
            hand_split: false,
            metronome: false,
            compose: false,
            presentation: false,
            handpan_sounds: true,
            scale: SCALES[0].name.to_string(),
        }
    }
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load `path`, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("ignoring preferences at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("saved preferences to {:?}", path);
        Ok(())
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

pub fn default_preferences_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("preferences.json")
}

pub fn default_patterns_path() -> PathBuf {
    app_dir(dirs::data_dir()).join("patterns.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("preferences.json");
        let prefs = Preferences {
            dark_theme: true,
            metronome: true,
            scale: "B Celtic".to_string(),
            ..Preferences::default()
        };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        assert_eq!(Preferences::load_or_default(&missing), Preferences::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "[1, 2").unwrap();
        assert_eq!(Preferences::load_or_default(&broken), Preferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, r#"{"compose": true}"#).unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert!(prefs.compose);
        assert!(prefs.handpan_sounds);
        assert_eq!(prefs.scale, "D Kurd");
    }

    #[test]
    fn test_default_paths() {
        assert!(default_patterns_path().ends_with("groovepan/patterns.json"));
        assert!(default_preferences_path().ends_with("groovepan/preferences.json"));
    }
}
