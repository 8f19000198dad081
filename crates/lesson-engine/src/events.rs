//! Notifications the engine emits to its host

use lessonflow_core::{Duration, LessonId};
use serde::Serialize;

/// Produced exactly once per logical transition and drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    SlideChanged { index: usize, total: usize },
    NarrationProgress { word_index: usize, percent: f64 },
    LessonCompleted(CompletionSummary),
}

/// Final numbers for a finished lesson
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSummary {
    pub lesson_id: LessonId,
    pub total_slides: usize,
    pub completed_count: usize,
    /// Wall-clock time from load to completion
    pub total_elapsed: Duration,
}
