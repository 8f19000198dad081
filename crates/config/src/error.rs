//! Failures while locating, reading or writing `config.toml`

use crate::validation::Violations;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform reported no home directory for the player settings
    #[error("no user config directory is available for lessonflow")]
    NoConfigDir,

    /// Also raised for a file that exists but is blank
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Creating the directory, the backup copy or the file itself failed
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot encode player settings: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("refusing to save out-of-range settings: {0}")]
    Invalid(Violations),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    #[test]
    fn test_read_error_names_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/lessonflow/config.toml"),
            source: io::Error::new(io::ErrorKind::InvalidData, "config file is blank"),
        };
        assert_eq!(
            err.to_string(),
            "cannot read /tmp/lessonflow/config.toml: config file is blank"
        );
    }

    #[test]
    fn test_invalid_lists_every_field() {
        let mut found = Violations::new();
        found.push(ValidationError::new("player.audio_speed", "expected 0.5 to 2, got 3"));
        found.push(ValidationError::new("app.progress_bar_width", "expected 10 to 200, got 4"));

        let message = ConfigError::Invalid(found).to_string();
        assert!(message.contains("player.audio_speed"));
        assert!(message.contains("; app.progress_bar_width"));
    }
}
