use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::physics::FieldSettings;

/// Application settings loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Colour scheme, "light" or "dark"
    pub theme: String,
    /// Tunables for the particle field
    #[serde(default)]
    pub field: FieldSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            field: FieldSettings::default(),
        }
    }
}

impl AppSettings {
    const SETTINGS_FILE: &'static str = "settings.toml";

    /// Loads settings from the settings file, or returns default settings if the file doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(Self::SETTINGS_FILE).exists() {
            let contents = fs::read_to_string(Self::SETTINGS_FILE)?;
            let settings: AppSettings = toml::from_str(&contents)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_tuning() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.field.desktop_count, 80);
        assert_eq!(settings.field.mobile_count, 40);
    }

    #[test]
    fn partial_toml_falls_back_to_field_defaults() {
        let settings: AppSettings = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.field.desktop_count, 80);
        assert!((settings.field.connect_distance - 140.0).abs() < f32::EPSILON);
    }

    #[test]
    fn field_overrides_are_honoured() {
        let settings: AppSettings = toml::from_str(
            "theme = \"dark\"\n[field]\ndesktop_count = 120\npointer_radius = 200.0\n",
        )
        .unwrap();
        assert_eq!(settings.field.desktop_count, 120);
        assert!((settings.field.pointer_radius - 200.0).abs() < f32::EPSILON);
        // Unspecified fields keep their defaults.
        assert_eq!(settings.field.mobile_count, 40);
    }
}
