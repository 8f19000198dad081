//! Reading and writing `config.toml`
//!
//! Writes go through a temporary file in the same directory and are renamed
//! into place. The previous file is copied to `config.toml.backup` first.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Written above the generated default config
const DEFAULT_HEADER: &str = "\
# LessonFlow configuration
#
# Player values can also be set per run through the environment:
#   LESSONFLOW_PLAYER_AUDIO_SPEED, LESSONFLOW_PLAYER_AUTO_PLAY_SPEED_MS,
#   LESSONFLOW_PLAYER_ALLOW_SKIP, LESSONFLOW_APP_LOG_LEVEL

";

/// Owns the location of one config file
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.config_path.with_extension("toml.backup")
    }

    /// Loads the file, or defaults when it does not exist yet
    ///
    /// A present but blank file is an error. Out-of-range values are kept and
    /// only logged so they can be corrected in place.
    pub fn load(&self) -> ConfigResult<Config> {
        let contents = match fs::read_to_string(&self.config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No config at {}, using defaults",
                    self.config_path.display()
                );
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.config_path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::Read {
                path: self.config_path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, "config file is blank"),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config version {} is newer than {}; unknown fields are ignored",
                config.version,
                CONFIG_VERSION
            );
        }
        if let Err(found) = config.validate() {
            log::warn!("Keeping out-of-range settings from the file: {}", found);
        }

        Ok(config)
    }

    /// Validates and writes `config`; nothing touches disk if validation fails
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.write(config, "")
    }

    /// Writes the default config with an explanatory header
    pub fn generate_default(&self) -> ConfigResult<()> {
        self.write(&Config::default(), DEFAULT_HEADER)?;
        log::info!("Generated default config at {}", self.config_path.display());
        Ok(())
    }

    fn write(&self, config: &Config, header: &str) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        let body = toml::to_string_pretty(config)?;

        let dir = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(write_error(dir))?;
            log::info!("Created config directory {}", dir.display());
        }

        if self.config_path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.config_path, &backup).map_err(write_error(&backup))?;
            log::debug!("Backed up config to {}", backup.display());
        }

        let mut temp = NamedTempFile::new_in(dir).map_err(write_error(dir))?;
        temp.write_all(header.as_bytes())
            .and_then(|()| temp.write_all(body.as_bytes()))
            .and_then(|()| temp.flush())
            .map_err(write_error(&self.config_path))?;
        temp.persist(&self.config_path)
            .map_err(|e| write_error(&self.config_path)(e.error))?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    }
}
