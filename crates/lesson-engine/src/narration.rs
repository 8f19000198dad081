//! Simulated narration of a slide's script
//!
//! Words are "spoken" one per tick at a fixed rate. There is no audio: the
//! simulator only produces progress and a single completion signal per run.

use crate::error::{EngineError, EngineResult};
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use lessonflow_core::{Duration, Timestamp};
use serde::Serialize;

/// Observable narration state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NarrationState {
    /// Words spoken so far
    pub word_index: usize,
    pub total_words: usize,
    pub is_playing: bool,
    pub is_finished: bool,
    pub progress_percent: f64,
}

/// Output of a narration tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NarrationSignal {
    Progress { word_index: usize, percent: f64 },
    Completed,
}

/// Milliseconds between words at `words_per_second`
pub fn tick_interval(words_per_second: f64) -> EngineResult<Duration> {
    if !words_per_second.is_finite() || words_per_second <= 0.0 {
        return Err(EngineError::Configuration(format!(
            "narration rate must be positive, got {} words/sec",
            words_per_second
        )));
    }
    let millis = (1_000.0 / words_per_second).round().max(1.0);
    Ok(Duration::from_millis(millis as u64))
}

#[derive(Debug)]
pub struct NarrationSimulator {
    total_words: usize,
    word_index: usize,
    interval: Duration,
    playing: bool,
    finished: bool,
    pending: Option<TimerId>,
}

impl NarrationSimulator {
    pub fn new() -> Self {
        Self {
            total_words: 0,
            word_index: 0,
            interval: Duration::from_millis(400),
            playing: false,
            finished: false,
            pending: None,
        }
    }

    /// Loads a script without starting it
    pub fn cue(
        &mut self,
        script: &str,
        words_per_second: f64,
        timers: &mut TimerQueue,
    ) -> EngineResult<()> {
        let interval = tick_interval(words_per_second)?;
        self.reset(timers);
        self.total_words = script.split_whitespace().count();
        self.interval = interval;
        Ok(())
    }

    /// Starts narrating `script` from the first word.
    ///
    /// An empty script completes at once and the returned signal says so.
    pub fn start(
        &mut self,
        script: &str,
        words_per_second: f64,
        now: Timestamp,
        timers: &mut TimerQueue,
    ) -> EngineResult<Option<NarrationSignal>> {
        self.cue(script, words_per_second, timers)?;

        if self.total_words == 0 {
            self.finished = true;
            log::debug!("Empty narration script, completing immediately");
            return Ok(Some(NarrationSignal::Completed));
        }

        self.resume(now, timers);
        log::debug!(
            "Narration started: {} words every {}",
            self.total_words,
            self.interval
        );
        Ok(None)
    }

    /// Stops ticking and keeps the position. Returns false if not playing.
    pub fn pause(&mut self, timers: &mut TimerQueue) -> bool {
        if !self.playing {
            return false;
        }
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.playing = false;
        true
    }

    /// Continues from the current word. Returns false if there is nothing to play.
    pub fn resume(&mut self, now: Timestamp, timers: &mut TimerQueue) -> bool {
        if self.playing || self.finished || self.word_index >= self.total_words {
            return false;
        }
        self.pending = Some(timers.schedule(now + self.interval, TimerKind::NarrationTick));
        self.playing = true;
        true
    }

    /// Back to word zero, stopped, with the script still cued
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.word_index = 0;
        self.playing = false;
        self.finished = false;
    }

    /// Handles a fired tick. Ticks this simulator did not schedule are ignored.
    pub fn on_timer(&mut self, fired: &FiredTimer, timers: &mut TimerQueue) -> Vec<NarrationSignal> {
        if self.pending != Some(fired.id) {
            log::warn!("Ignoring stale narration tick {}", fired.id);
            return Vec::new();
        }
        self.pending = None;

        self.word_index += 1;
        let mut signals = vec![NarrationSignal::Progress {
            word_index: self.word_index,
            percent: self.progress_percent(),
        }];

        if self.word_index >= self.total_words {
            self.playing = false;
            self.finished = true;
            signals.push(NarrationSignal::Completed);
        } else {
            // Next word is measured from this tick's deadline, not from when it was handled
            self.pending = Some(timers.schedule(
                fired.deadline + self.interval,
                TimerKind::NarrationTick,
            ));
        }

        signals
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_words == 0 {
            return 0.0;
        }
        (self.word_index as f64 / self.total_words as f64 * 100.0).min(100.0)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> NarrationState {
        NarrationState {
            word_index: self.word_index,
            total_words: self.total_words,
            is_playing: self.playing,
            is_finished: self.finished,
            progress_percent: self.progress_percent(),
        }
    }
}

impl Default for NarrationSimulator {
    fn default() -> Self {
        Self::new()
    }
}
