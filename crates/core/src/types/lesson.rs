//! Lesson domain model

use crate::types::{Duration, RawId, Slide, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Slide counts accepted by the authoring tools. Playback accepts any
/// non-empty lesson.
pub const AUTHORED_SLIDE_RANGE: RangeInclusive<usize> = 5..=25;

/// Unique identifier for a lesson
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(RawId);

impl LessonId {
    /// Creates a new random LessonId
    pub fn new() -> Self {
        Self(RawId::Text(Uuid::new_v4().to_string()))
    }

    /// Creates a LessonId from an authored number
    pub fn from_number(n: u64) -> Self {
        Self(RawId::Number(n))
    }
}

impl Default for LessonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback settings carried by the lesson itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonSettings {
    /// Dwell time for slides without their own duration
    #[serde(alias = "autoPlaySpeed")]
    pub autoplay_dwell_ms: Duration,

    /// Simulated narration rate
    pub narration_rate_words_per_sec: f64,

    /// Whether narration starts enabled
    pub audio_enabled_by_default: bool,
}

impl LessonSettings {
    pub const DEFAULT_DWELL_MS: u64 = 30_000;
    pub const DEFAULT_WORDS_PER_SEC: f64 = 2.5;
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            autoplay_dwell_ms: Duration::from_millis(Self::DEFAULT_DWELL_MS),
            narration_rate_words_per_sec: Self::DEFAULT_WORDS_PER_SEC,
            audio_enabled_by_default: true,
        }
    }
}

impl Validator for LessonSettings {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.autoplay_dwell_ms.is_zero() {
            errors.push("Autoplay dwell time must be positive".to_string());
        }

        let rate = self.narration_rate_words_per_sec;
        if !rate.is_finite() || rate <= 0.0 {
            errors.push(format!("Narration rate must be a positive number, got {}", rate));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Ordered collection of slides plus playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: LessonId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: LessonSettings,
    pub slides: Vec<Slide>,
}

impl Lesson {
    /// Creates a lesson with default settings
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            id: LessonId::new(),
            title: title.into(),
            description: None,
            settings: LessonSettings::default(),
            slides,
        }
    }

    /// Replaces the lesson settings
    pub fn with_settings(mut self, settings: LessonSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Returns the slide at `index`, if any
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Returns true if the slide count is within the authoring range
    pub fn is_authored_length(&self) -> bool {
        AUTHORED_SLIDE_RANGE.contains(&self.slides.len())
    }

    /// Total narration words across all slides
    pub fn total_words(&self) -> usize {
        self.slides.iter().map(Slide::word_count).sum()
    }
}

impl Validator for Lesson {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.slides.is_empty() {
            errors.push("Lesson must contain at least one slide".to_string());
        }

        if let Err(settings_errors) = self.settings.validate() {
            errors.extend(settings_errors);
        }

        for slide in &self.slides {
            if let Err(slide_errors) = slide.validate() {
                errors.extend(slide_errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
