//! Entry point the player and the `lessonflow` binary use for settings
//!
//! Settings live in `config.toml` under the platform config directory unless a
//! directory is given explicitly. Environment overrides apply to one run only
//! and are never written back.

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

const ENV_AUDIO_SPEED: &str = "LESSONFLOW_PLAYER_AUDIO_SPEED";
const ENV_AUTO_PLAY_SPEED: &str = "LESSONFLOW_PLAYER_AUTO_PLAY_SPEED_MS";
const ENV_ALLOW_SKIP: &str = "LESSONFLOW_PLAYER_ALLOW_SKIP";
const ENV_LOG_LEVEL: &str = "LESSONFLOW_APP_LOG_LEVEL";

type Override = fn(&mut Config, &str) -> Result<(), String>;

const ENV_OVERRIDES: &[(&str, Override)] = &[
    (ENV_AUDIO_SPEED, |config, raw| {
        config.player.audio_speed = raw.parse().map_err(|_| "not a number".to_string())?;
        Ok(())
    }),
    (ENV_AUTO_PLAY_SPEED, |config, raw| {
        let ms = raw.parse().map_err(|_| "not a whole number of milliseconds".to_string())?;
        config.player.auto_play_speed_ms = Some(ms);
        Ok(())
    }),
    (ENV_ALLOW_SKIP, |config, raw| {
        config.player.allow_skip = raw.parse().map_err(|_| "expected true or false".to_string())?;
        Ok(())
    }),
    (ENV_LOG_LEVEL, |config, raw| {
        config.app.log_level = raw.parse::<LogLevel>().map_err(|e| e.problem)?;
        Ok(())
    }),
];

/// Player settings stored in one directory
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses the platform config directory, e.g. `~/.config/lessonflow/` on Linux
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "lessonflow").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_directory(dirs.config_dir()))
    }

    /// Keeps `config.toml` in `config_dir`, which is created on first save
    pub fn with_directory(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            persistence: ConfigPersistence::new(config_dir.join(CONFIG_FILE)),
            config_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        self.persistence.path()
    }

    /// Defaults when the file is missing; an error when it is blank or unparseable
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("{}; playing with default settings", e);
            Config::default()
        })
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `change` and saves
    ///
    /// ```rust,no_run
    /// # use lessonflow_config::ConfigManager;
    /// # fn main() -> Result<(), lessonflow_config::ConfigError> {
    /// let manager = ConfigManager::new()?;
    /// manager.update(|config| config.player.audio_speed = 1.5)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn update<F>(&self, change: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)
    }

    /// Writes the commented default file; `false` if one was already there
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!("Keeping existing config at {}", self.config_path().display());
            return Ok(false);
        }
        self.persistence.generate_default()?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Every out-of-range setting in the stored file, one line each
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;
        Ok(match config.validate() {
            Ok(()) => Vec::new(),
            Err(found) => found.iter().map(ToString::to_string).collect(),
        })
    }

    /// The stored settings with any `LESSONFLOW_*` variables applied on top
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(found) = config.validate() {
            log::warn!("Settings out of range after environment overrides: {}", found);
        }
        Ok(config)
    }
}

/// Unparseable values are logged and leave the setting unchanged
fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (key, apply) in ENV_OVERRIDES {
        let Some(raw) = lookup(key) else { continue };
        if let Err(problem) = apply(config, &raw) {
            log::warn!("Ignoring {}={}: {}", key, raw, problem);
        }
    }
}
