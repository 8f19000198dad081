//! Lesson playback state machine
//!
//! [`PlaybackEngine`] owns the playback state of one lesson and composes the
//! narration simulator, the autoplay scheduler and the navigation policy.
//! It never sleeps: the host calls [`PlaybackEngine::fire_due_timers`]
//! whenever its clock reaches [`PlaybackEngine::next_deadline`], then drains
//! the emitted events.

use crate::autoplay::{AdvanceTrigger, AutoplayScheduler};
use crate::clock::Clock;
use crate::events::{CompletionSummary, EngineEvent};
use crate::narration::{self, NarrationSignal, NarrationSimulator};
use crate::navigation::NavigationPolicy;
use crate::renderer::{RendererRegistry, SlideView};
use crate::state::{PlaybackSnapshot, PlaybackState, ProgressView, SlidePhase};
use crate::timer::{FiredTimer, TimerKind, TimerQueue};
use crate::{EngineError, EngineResult, NavigationError};
use lessonflow_config::{ConfigSection, PlayerConfig};
use lessonflow_core::{Duration, Lesson, Timestamp, Validator};
use log::{debug, info, warn};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// How a slide is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// Sequential advance: narrate and arm autoplay
    Play,
    /// Going back or jumping: show the slide and wait
    Show,
}

struct Session {
    lesson: Arc<Lesson>,
    state: PlaybackState,
    words_per_second: f64,
    default_dwell: Duration,
}

pub struct PlaybackEngine {
    clock: Arc<dyn Clock>,
    config: PlayerConfig,
    session: Option<Session>,
    timers: TimerQueue,
    narration: NarrationSimulator,
    autoplay: AutoplayScheduler,
    outbox: VecDeque<EngineEvent>,
}

impl PlaybackEngine {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            config: PlayerConfig::default(),
            session: None,
            timers: TimerQueue::new(),
            narration: NarrationSimulator::new(),
            autoplay: AutoplayScheduler::new(),
            outbox: VecDeque::new(),
        }
    }

    pub fn with_config(clock: impl Clock + 'static, config: PlayerConfig) -> EngineResult<Self> {
        if let Err(found) = config.validate() {
            warn!("Rejected player configuration: {}", found);
            return Err(EngineError::Configuration(found.to_string()));
        }

        let mut engine = Self::new(clock);
        engine.config = config;
        Ok(engine)
    }

    /// Starts playing `lesson` from its first slide.
    ///
    /// Any lesson already playing is torn down first, timers included. On
    /// error the engine is left exactly as it was.
    pub fn load(&mut self, lesson: impl Into<Arc<Lesson>>) -> EngineResult<()> {
        let lesson = lesson.into();
        lesson
            .validate()
            .map_err(|errors| EngineError::InvalidLesson(errors.join("; ")))?;

        let default_dwell = self
            .config
            .auto_play_speed_ms
            .map(Duration::from_millis)
            .unwrap_or(lesson.settings.autoplay_dwell_ms);
        let words_per_second =
            lesson.settings.narration_rate_words_per_sec * f64::from(self.config.audio_speed);
        narration::tick_interval(words_per_second)?;

        self.clear_timers();

        let now = self.clock.now();
        let total = lesson.slide_count();
        info!("Loaded lesson '{}' ({} slides)", lesson.title, total);
        if !lesson.is_authored_length() {
            debug!("Lesson has {} slides, outside the usual authored range", total);
        }

        let state = PlaybackState::new(
            now,
            self.config.autoplay_on_start,
            lesson.settings.audio_enabled_by_default,
        );
        self.session = Some(Session {
            lesson,
            state,
            words_per_second,
            default_dwell,
        });

        self.outbox
            .push_back(EngineEvent::SlideChanged { index: 0, total });
        self.enter_current(Entry::Play, now);
        Ok(())
    }

    /// Drops the current lesson and cancels every timer
    pub fn unload(&mut self) {
        self.clear_timers();
        if let Some(session) = self.session.take() {
            info!("Unloaded lesson '{}'", session.lesson.title);
        }
    }

    /// Completes the current slide and moves on, finishing the lesson on the last slide
    pub fn next(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            debug!("next() ignored: no lesson loaded");
            return;
        };
        if session.state.is_finished() {
            debug!("next() ignored: lesson already completed");
            return;
        }

        let index = session.state.current_index();
        let total = session.lesson.slide_count();
        session.state.mark_completed(index);

        if index + 1 >= total {
            session.state.finish(now);
            let summary = CompletionSummary {
                lesson_id: session.lesson.id.clone(),
                total_slides: total,
                completed_count: session.state.completed_count(),
                total_elapsed: session.state.total_elapsed(now),
            };
            info!(
                "Lesson '{}' completed in {}",
                session.lesson.title,
                summary.total_elapsed.as_clock()
            );
            self.clear_timers();
            self.outbox.push_back(EngineEvent::LessonCompleted(summary));
        } else {
            session.state.enter(index + 1, now);
            self.outbox.push_back(EngineEvent::SlideChanged {
                index: index + 1,
                total,
            });
            self.enter_current(Entry::Play, now);
        }
    }

    pub fn previous(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let index = session.state.current_index();
        if session.state.is_finished() || index == 0 {
            return;
        }

        session.state.enter(index - 1, now);
        let total = session.lesson.slide_count();
        self.outbox.push_back(EngineEvent::SlideChanged {
            index: index - 1,
            total,
        });
        self.enter_current(Entry::Show, now);
    }

    /// Jumps to a reachable slide without completing the current one
    pub fn jump_to(&mut self, index: usize) -> EngineResult<()> {
        let now = self.clock.now();
        let session = self
            .session
            .as_mut()
            .ok_or(NavigationError::NoLessonLoaded)?;
        let total = session.lesson.slide_count();
        NavigationPolicy::check_jump(index, &session.state, total, self.config.allow_skip)?;

        if index == session.state.current_index() {
            debug!("jump_to({}) ignored: already on that slide", index);
            return Ok(());
        }

        session.state.enter(index, now);
        self.outbox
            .push_back(EngineEvent::SlideChanged { index, total });
        self.enter_current(Entry::Show, now);
        Ok(())
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            debug!("set_autoplay({}) ignored: no lesson loaded", enabled);
            return;
        };
        if session.state.autoplay_enabled() == enabled {
            return;
        }

        session.state.set_autoplay(enabled);
        info!("Autoplay {}", if enabled { "on" } else { "off" });
        if session.state.is_finished() {
            return;
        }

        let current_completed = session.state.is_completed(session.state.current_index());
        if !enabled {
            self.autoplay.disarm(&mut self.timers);
        } else if !current_completed {
            self.arm_autoplay(now);
        }
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            debug!("set_audio_enabled({}) ignored: no lesson loaded", enabled);
            return;
        };
        if session.state.audio_enabled() == enabled {
            return;
        }

        session.state.set_audio(enabled);
        info!("Narration {}", if enabled { "on" } else { "off" });
        if session.state.is_finished() {
            return;
        }

        let current_completed = session.state.is_completed(session.state.current_index());
        if enabled {
            if !current_completed {
                self.start_narration(now);
            }
        } else {
            self.narration.reset(&mut self.timers);
        }

        // The trigger depends on audio, so an armed advance is re-evaluated
        if self.autoplay.is_armed() {
            self.arm_autoplay(now);
        }
    }

    /// Pauses narration on the current slide. Returns false if it was not playing.
    pub fn pause_narration(&mut self) -> bool {
        self.narration.pause(&mut self.timers)
    }

    /// Resumes narration where it stopped. Returns false if there is nothing to resume.
    pub fn resume_narration(&mut self) -> bool {
        let now = self.clock.now();
        if !self.narration_allowed() {
            return false;
        }
        self.narration.resume(now, &mut self.timers)
    }

    /// Narrates the current slide again from its first word
    pub fn restart_narration(&mut self) -> bool {
        let now = self.clock.now();
        if !self.narration_allowed() {
            return false;
        }
        if !self.start_narration(now) {
            return false;
        }
        if self.autoplay.armed_trigger() == Some(AdvanceTrigger::Narration) {
            self.arm_autoplay(now);
        }
        true
    }

    /// Fires every timer whose deadline has passed. Returns how many fired.
    pub fn fire_due_timers(&mut self) -> usize {
        let mut fired_count = 0;
        loop {
            let now = self.clock.now();
            let Some(fired) = self.timers.pop_due(now) else {
                break;
            };
            fired_count += 1;
            self.dispatch(fired);
        }
        fired_count
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timers.next_deadline()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.outbox.drain(..).collect()
    }

    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let session = self.session.as_ref()?;
        let now = self.clock.now();
        let state = &session.state;
        let total = session.lesson.slide_count();
        let script_words: Vec<String> = session
            .lesson
            .slide(state.current_index())
            .map(|slide| slide.words().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        Some(PlaybackSnapshot {
            lesson_id: session.lesson.id.clone(),
            lesson_title: session.lesson.title.clone(),
            current_index: state.current_index(),
            total_slides: total,
            completed_indices: state.completed().iter().copied().collect(),
            phase: self.phase(),
            autoplay_enabled: state.autoplay_enabled(),
            audio_enabled: state.audio_enabled(),
            narration: self.narration.state(),
            script_words,
            time_on_slide: state.time_on_current(now),
            total_elapsed: state.total_elapsed(now),
            advance_at: self
                .autoplay
                .pending_timer()
                .and_then(|id| self.timers.deadline(id)),
            progress: self.config.show_progress.then(|| ProgressView {
                percent: NavigationPolicy::progress_percent(state, total),
                indicators: NavigationPolicy::indicators(state, total),
            }),
            is_completed: state.is_finished(),
        })
    }

    pub fn phase(&self) -> SlidePhase {
        match &self.session {
            Some(session) if session.state.is_finished() => SlidePhase::Completed,
            Some(_) if self.autoplay.pending_timer().is_some() => SlidePhase::Advancing,
            Some(_) if self.narration.is_playing() => SlidePhase::Narrating,
            Some(_) if self.narration.is_finished() => SlidePhase::NarrationDone,
            _ => SlidePhase::Idle,
        }
    }

    /// The current slide with its position, for a renderer
    pub fn current_view(&self) -> Option<SlideView<'_>> {
        let session = self.session.as_ref()?;
        let index = session.state.current_index();
        Some(SlideView {
            slide: session.lesson.slide(index)?,
            index,
            total: session.lesson.slide_count(),
        })
    }

    pub fn render_current<O>(&self, registry: &RendererRegistry<O>) -> Option<O> {
        self.current_view().map(|view| registry.render(&view))
    }

    /// Accumulated viewing time per slide index
    pub fn time_per_slide(&self) -> BTreeMap<usize, Duration> {
        match &self.session {
            Some(session) => session.state.time_per_slide(self.clock.now()),
            None => BTreeMap::new(),
        }
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.session.as_ref().map(|s| s.lesson.as_ref())
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.state().is_some_and(PlaybackState::is_finished)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn dispatch(&mut self, fired: FiredTimer) {
        match fired.kind {
            TimerKind::NarrationTick => {
                for signal in self.narration.on_timer(&fired, &mut self.timers) {
                    match signal {
                        NarrationSignal::Progress {
                            word_index,
                            percent,
                        } => {
                            self.outbox.push_back(EngineEvent::NarrationProgress {
                                word_index,
                                percent,
                            });
                        }
                        NarrationSignal::Completed => {
                            debug!("Narration completed at {}", fired.deadline);
                            self.autoplay
                                .narration_completed(fired.deadline, &mut self.timers);
                        }
                    }
                }
            }
            TimerKind::AdvanceDelay | TimerKind::Dwell => {
                if self.autoplay.on_timer(&fired).is_some() {
                    debug!("Autoplay advancing at {}", fired.deadline);
                    self.next();
                }
            }
        }
    }

    /// Resets slide-local state after the index changed
    fn enter_current(&mut self, entry: Entry, now: Timestamp) {
        self.autoplay.disarm(&mut self.timers);
        self.narration.reset(&mut self.timers);

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let index = session.state.current_index();
        let Some(slide) = session.lesson.slide(index) else {
            return;
        };
        debug!("Entering slide {} '{}' ({:?})", index, slide.title, entry);

        if let Err(e) = self.narration.cue(
            &slide.narration_script,
            session.words_per_second,
            &mut self.timers,
        ) {
            warn!("Could not cue narration for slide {}: {}", index, e);
        }

        if entry == Entry::Play {
            let audio_enabled = session.state.audio_enabled();
            let autoplay_enabled = session.state.autoplay_enabled();
            if audio_enabled {
                self.start_narration(now);
            }
            if autoplay_enabled {
                self.arm_autoplay(now);
            }
        }
    }

    /// Starts narration of the current slide's script. Returns false if it has none.
    fn start_narration(&mut self, now: Timestamp) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(slide) = session.lesson.slide(session.state.current_index()) else {
            return false;
        };
        if !slide.has_narration() {
            return false;
        }

        match self.narration.start(
            &slide.narration_script,
            session.words_per_second,
            now,
            &mut self.timers,
        ) {
            Ok(_) => true,
            Err(e) => {
                warn!("Could not start narration: {}", e);
                false
            }
        }
    }

    /// Arms the advance for the current slide based on its trigger
    fn arm_autoplay(&mut self, now: Timestamp) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(slide) = session.lesson.slide(session.state.current_index()) else {
            return;
        };

        let trigger = AdvanceTrigger::for_slide(
            slide,
            session.state.audio_enabled(),
            session.default_dwell,
        );
        let elapsed = session.state.time_on_current(now);
        self.autoplay
            .arm(trigger, true, elapsed, now, &mut self.timers);

        if trigger == AdvanceTrigger::Narration {
            if self.narration.is_finished() {
                self.autoplay.narration_completed(now, &mut self.timers);
            } else if !self.narration.is_playing() {
                self.narration.resume(now, &mut self.timers);
            }
        }
    }

    fn narration_allowed(&self) -> bool {
        match &self.session {
            Some(session) => session.state.audio_enabled() && !session.state.is_finished(),
            None => false,
        }
    }

    fn clear_timers(&mut self) {
        self.narration.reset(&mut self.timers);
        self.autoplay.disarm(&mut self.timers);
        self.timers.clear();
    }
}
