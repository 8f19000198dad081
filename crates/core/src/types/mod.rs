//! Domain types for LessonFlow
//!
//! This module contains all domain models organized by responsibility:
//! - `lesson`: Lesson and its playback settings
//! - `slide`: Slides, slide kinds and identifiers
//! - `common`: Shared time types and the `Validator` trait

mod common;
mod lesson;
mod slide;

// Re-export all public types
pub use common::{Duration, Timestamp, Validator};
pub use lesson::{Lesson, LessonId, LessonSettings, AUTHORED_SLIDE_RANGE};
pub use slide::{RawId, Slide, SlideId, SlideKind};
