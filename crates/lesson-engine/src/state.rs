// FILE: crates/lesson-engine/src/state.rs

use crate::narration::NarrationState;
use lessonflow_core::{Duration, LessonId, Timestamp};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Where the current slide is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlidePhase {
    /// Shown, nothing running
    Idle,
    Narrating,
    NarrationDone,
    /// An automatic advance is scheduled
    Advancing,
    /// The whole lesson is finished
    Completed,
}

/// How a slide appears in the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideIndicator {
    Current,
    Completed,
    /// Reachable by a jump but not completed yet
    Available,
    Locked,
}

/// Progress section of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    /// Position through the lesson, counting the current slide
    pub percent: f64,
    pub indicators: Vec<SlideIndicator>,
}

/// Everything a host needs to draw the player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub lesson_id: LessonId,
    pub lesson_title: String,
    pub current_index: usize,
    pub total_slides: usize,
    pub completed_indices: Vec<usize>,
    pub phase: SlidePhase,
    pub autoplay_enabled: bool,
    pub audio_enabled: bool,
    pub narration: NarrationState,
    /// The current slide's script split into words; the first
    /// `narration.word_index` of them have been spoken
    pub script_words: Vec<String>,
    pub time_on_slide: Duration,
    pub total_elapsed: Duration,
    /// When the pending automatic advance will happen
    pub advance_at: Option<Timestamp>,
    /// Absent when the player is configured to hide progress
    pub progress: Option<ProgressView>,
    pub is_completed: bool,
}

/// Per-lesson playback bookkeeping
#[derive(Debug, Clone)]
pub struct PlaybackState {
    current_index: usize,
    completed: BTreeSet<usize>,
    slide_entered_at: Timestamp,
    autoplay_enabled: bool,
    audio_enabled: bool,
    finished: bool,
    elapsed_before_current: Duration,
    time_per_slide: BTreeMap<usize, Duration>,
}

impl PlaybackState {
    pub fn new(now: Timestamp, autoplay_enabled: bool, audio_enabled: bool) -> Self {
        Self {
            current_index: 0,
            completed: BTreeSet::new(),
            slide_entered_at: now,
            autoplay_enabled,
            audio_enabled,
            finished: false,
            elapsed_before_current: Duration::ZERO,
            time_per_slide: BTreeMap::new(),
        }
    }

    // Getters

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn slide_entered_at(&self) -> Timestamp {
        self.slide_entered_at
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time on the current slide; zero once the lesson is finished
    pub fn time_on_current(&self, now: Timestamp) -> Duration {
        if self.finished {
            return Duration::ZERO;
        }
        now.saturating_since(self.slide_entered_at)
    }

    /// Wall-clock time since the lesson was loaded, frozen at completion
    pub fn total_elapsed(&self, now: Timestamp) -> Duration {
        self.elapsed_before_current + self.time_on_current(now)
    }

    /// Accumulated time per slide index, including the current visit
    pub fn time_per_slide(&self, now: Timestamp) -> BTreeMap<usize, Duration> {
        let mut times = self.time_per_slide.clone();
        if !self.finished {
            *times.entry(self.current_index).or_default() += self.time_on_current(now);
        }
        times
    }

    // Setters

    pub(crate) fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay_enabled = enabled;
    }

    pub(crate) fn set_audio(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }

    pub(crate) fn mark_completed(&mut self, index: usize) {
        self.completed.insert(index);
    }

    /// Leaves the current slide and enters `index`
    pub(crate) fn enter(&mut self, index: usize, now: Timestamp) {
        self.record_visit(now);
        self.current_index = index;
        self.slide_entered_at = now;
    }

    /// Leaves the current slide for good
    pub(crate) fn finish(&mut self, now: Timestamp) {
        self.record_visit(now);
        self.finished = true;
    }

    fn record_visit(&mut self, now: Timestamp) {
        let spent = now.saturating_since(self.slide_entered_at);
        *self.time_per_slide.entry(self.current_index).or_default() += spent;
        self.elapsed_before_current += spent;
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_new_state() {
        let state = PlaybackState::new(at(0), false, true);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.completed_count(), 0);
        assert!(!state.autoplay_enabled());
        assert!(state.audio_enabled());
        assert!(!state.is_finished());
    }

    #[test]
    fn test_time_on_slide_and_total() {
        let mut state = PlaybackState::new(at(0), false, true);
        state.enter(1, at(6_000));
        state.enter(0, at(9_000));

        assert_eq!(state.time_on_current(at(10_000)), Duration::from_seconds(1));
        assert_eq!(state.total_elapsed(at(10_000)), Duration::from_seconds(10));

        let times = state.time_per_slide(at(10_000));
        assert_eq!(times.get(&0), Some(&Duration::from_seconds(7)));
        assert_eq!(times.get(&1), Some(&Duration::from_seconds(3)));
    }

    #[test]
    fn test_total_elapsed_frozen_after_finish() {
        let mut state = PlaybackState::new(at(0), false, true);
        state.mark_completed(0);
        state.finish(at(4_000));

        assert!(state.is_finished());
        assert_eq!(state.total_elapsed(at(60_000)), Duration::from_seconds(4));
        assert_eq!(state.time_on_current(at(60_000)), Duration::ZERO);
    }

    #[test]
    fn test_completed_set_is_idempotent() {
        let mut state = PlaybackState::new(at(0), false, true);
        state.mark_completed(2);
        state.mark_completed(2);
        assert_eq!(state.completed_count(), 1);
        assert!(state.is_completed(2));
        assert!(!state.is_completed(1));
    }
}
