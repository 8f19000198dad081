//! Slide domain model

use crate::types::{Duration, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier as it appears in lesson files: authored lessons use numbers,
/// generated ones use UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Unique identifier for a slide
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(RawId);

impl SlideId {
    /// Creates a new random SlideId
    pub fn new() -> Self {
        Self(RawId::Text(Uuid::new_v4().to_string()))
    }

    /// Creates a SlideId from an authored number
    pub fn from_number(n: u64) -> Self {
        Self(RawId::Number(n))
    }
}

impl Default for SlideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slide type tag.
///
/// Unknown tags are kept verbatim in `Other` so a host can still render a
/// fallback for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlideKind {
    Intro,
    Concept,
    Importance,
    #[default]
    Content,
    Conclusion,
    Other(String),
}

impl SlideKind {
    /// Returns the tag used in lesson files
    pub fn as_str(&self) -> &str {
        match self {
            SlideKind::Intro => "intro",
            SlideKind::Concept => "concept",
            SlideKind::Importance => "importance",
            SlideKind::Content => "content",
            SlideKind::Conclusion => "conclusion",
            SlideKind::Other(tag) => tag,
        }
    }

    /// Returns true for tags outside the known set
    pub fn is_unknown(&self) -> bool {
        matches!(self, SlideKind::Other(_))
    }
}

impl From<&str> for SlideKind {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "intro" => SlideKind::Intro,
            "concept" => SlideKind::Concept,
            "importance" => SlideKind::Importance,
            "content" => SlideKind::Content,
            "conclusion" => SlideKind::Conclusion,
            _ => SlideKind::Other(tag.to_string()),
        }
    }
}

impl From<String> for SlideKind {
    fn from(tag: String) -> Self {
        SlideKind::from(tag.as_str())
    }
}

impl From<SlideKind> for String {
    fn from(kind: SlideKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of instructional content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default)]
    pub id: SlideId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SlideKind,
    #[serde(default, alias = "audioScript")]
    pub narration_script: String,
    /// Dwell override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Type-specific payload, opaque to playback
    #[serde(default)]
    pub content: serde_json::Value,
}

impl Slide {
    /// Creates a slide with no narration and no content payload
    pub fn new(title: impl Into<String>, kind: SlideKind) -> Self {
        Self {
            id: SlideId::new(),
            title: title.into(),
            subtitle: None,
            kind,
            narration_script: String::new(),
            duration: None,
            content: serde_json::Value::Null,
        }
    }

    /// Sets the narration script
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.narration_script = script.into();
        self
    }

    /// Sets the per-slide dwell override
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the content payload
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Whitespace-delimited narration tokens
    pub fn words(&self) -> Vec<&str> {
        self.narration_script.split_whitespace().collect()
    }

    /// Number of narration tokens
    pub fn word_count(&self) -> usize {
        self.narration_script.split_whitespace().count()
    }

    /// Returns true if the script has at least one token
    pub fn has_narration(&self) -> bool {
        self.word_count() > 0
    }

    /// Dwell time for this slide, falling back to the lesson default
    pub fn dwell(&self, default_dwell: Duration) -> Duration {
        self.duration.unwrap_or(default_dwell)
    }
}

impl Validator for Slide {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            log::warn!("Slide {} has no title", self.id);
        }

        if let Some(duration) = self.duration {
            if duration.is_zero() {
                errors.push(format!("Slide {} duration must be positive", self.id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
