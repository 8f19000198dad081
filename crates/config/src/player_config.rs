//! The `[player]` table: host-side playback preferences applied to every lesson

use crate::validation::{ConfigSection, Violations};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Autoplay dwell in milliseconds; replaces each lesson's `autoPlaySpeed`
    /// but not a slide's own `duration`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_play_speed_ms: Option<u64>,

    /// Multiplies the lesson's narration words per second
    pub audio_speed: f32,

    /// Include the progress section in playback snapshots
    pub show_progress: bool,

    /// When false, jumping to a slide is refused; next and previous still work
    pub allow_skip: bool,

    pub autoplay_on_start: bool,
}

impl PlayerConfig {
    pub const MIN_AUDIO_SPEED: f32 = 0.5;
    pub const MAX_AUDIO_SPEED: f32 = 2.0;
    pub const MIN_DWELL_MS: u64 = 1_000;
    pub const MAX_DWELL_MS: u64 = 600_000;
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play_speed_ms: None,
            audio_speed: 1.0,
            show_progress: true,
            allow_skip: true,
            autoplay_on_start: false,
        }
    }
}

impl ConfigSection for PlayerConfig {
    const NAME: &'static str = "player";

    fn check(&self, found: &mut Violations) {
        found.check_range(
            Self::NAME,
            "audio_speed",
            self.audio_speed,
            Self::MIN_AUDIO_SPEED,
            Self::MAX_AUDIO_SPEED,
        );
        if let Some(dwell) = self.auto_play_speed_ms {
            found.check_range(
                Self::NAME,
                "auto_play_speed_ms",
                dwell,
                Self::MIN_DWELL_MS,
                Self::MAX_DWELL_MS,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_audio_speed_outside_bounds() {
        for speed in [2.5, 0.25, f32::NAN, f32::INFINITY] {
            let config = PlayerConfig {
                audio_speed: speed,
                ..PlayerConfig::default()
            };
            assert!(config.validate().is_err(), "speed {} accepted", speed);
        }
    }

    #[test]
    fn test_audio_speed_bounds_are_inclusive() {
        let mut config = PlayerConfig::default();
        config.audio_speed = 0.5;
        assert!(config.validate().is_ok());
        config.audio_speed = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dwell_override_range() {
        let mut config = PlayerConfig::default();
        config.auto_play_speed_ms = Some(0);
        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors.iter().next().map(|e| e.field.as_str()),
            Some("player.auto_play_speed_ms")
        );

        config.auto_play_speed_ms = Some(45_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_both_problems_reported_together() {
        let config = PlayerConfig {
            audio_speed: 9.0,
            auto_play_speed_ms: Some(1),
            ..PlayerConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().len(), 2);
    }
}
