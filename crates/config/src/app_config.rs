//! The `[app]` table: how the `lessonflow` binary talks to the terminal

use crate::validation::{ConfigSection, ValidationError, Violations};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default `env_logger` filter when `RUST_LOG` is unset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ValidationError::new(
                "app.log_level",
                format!("expected error, warn, info, debug or trace, got {:?}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,

    /// Styled slide titles, status and narration highlighting
    pub color_output: bool,

    /// Columns taken by the lesson progress bar in `lessonflow play`
    pub progress_bar_width: usize,
}

impl AppConfig {
    pub const MIN_BAR_WIDTH: usize = 10;
    pub const MAX_BAR_WIDTH: usize = 200;
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            color_output: true,
            progress_bar_width: 40,
        }
    }
}

impl ConfigSection for AppConfig {
    const NAME: &'static str = "app";

    fn check(&self, found: &mut Violations) {
        found.check_range(
            Self::NAME,
            "progress_bar_width",
            self.progress_bar_width,
            Self::MIN_BAR_WIDTH,
            Self::MAX_BAR_WIDTH,
        );
    }
}
