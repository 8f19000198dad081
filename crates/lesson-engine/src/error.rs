// FILE: crates/lesson-engine/src/error.rs

use thiserror::Error;

/// Why a direct jump was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Slide {index} is out of bounds (lesson has {total} slides)")]
    OutOfBounds { index: usize, total: usize },

    #[error("Slide {index} is not reachable yet (current slide is {current})")]
    Unreachable { index: usize, current: usize },

    #[error("Skipping between slides is disabled")]
    SkipDisabled,

    #[error("Lesson is already completed")]
    LessonCompleted,

    #[error("No lesson loaded")]
    NoLessonLoaded,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid lesson: {0}")]
    InvalidLesson(String),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
