//! Domain model shared by the LessonFlow crates: lessons, slides, and the
//! millisecond time types playback is measured in.

pub mod types;

// Re-export commonly used types
pub use types::{
    Duration, Lesson, LessonId, LessonSettings, RawId, Slide, SlideId, SlideKind, Timestamp,
    Validator, AUTHORED_SLIDE_RANGE,
};
