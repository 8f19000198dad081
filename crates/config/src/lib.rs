//! Settings for the LessonFlow player, kept in `config.toml`
//!
//! The file has two tables. `[player]` holds the preferences the lesson
//! engine applies to every lesson it loads: dwell override, narration speed,
//! progress display, skipping and autoplay on start. `[app]` holds what only
//! the `lessonflow` binary cares about: log filter, colours and the progress
//! bar width.
//!
//! ```rust,no_run
//! use lessonflow_config::ConfigManager;
//!
//! # fn main() -> Result<(), lessonflow_config::ConfigError> {
//! let manager = ConfigManager::new()?;
//! let config = manager.load_with_env_overrides()?;
//! println!("narration at {}x", config.player.audio_speed);
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

pub mod app_config;
mod player_config;

pub use app_config::{AppConfig, LogLevel};
pub use error::{ConfigError, ConfigResult};
pub use manager::ConfigManager;
pub use player_config::PlayerConfig;
pub use validation::{ConfigSection, ValidationError, Violations};

use serde::{Deserialize, Serialize};

/// Written to new files; a file claiming a later version still loads
pub const CONFIG_VERSION: u32 = 1;

/// Contents of `config.toml`; missing tables and keys take their defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub app: AppConfig,
    pub player: PlayerConfig,
}

impl Config {
    /// Checks both tables and reports everything out of range at once
    pub fn validate(&self) -> Result<(), Violations> {
        let mut found = Violations::new();
        self.app.check(&mut found);
        self.player.check(&mut found);
        found.into_result()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_both_tables() {
        let mut config = Config::default();
        config.app.progress_bar_width = 0;
        config.player.audio_speed = 9.0;

        let errors = config.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["app.progress_bar_width", "player.audio_speed"]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[player]\nallow_skip = false\n").unwrap();
        assert!(!config.player.allow_skip);
        assert_eq!(config.player.audio_speed, 1.0);
        assert_eq!(config.app, AppConfig::default());
    }
}
