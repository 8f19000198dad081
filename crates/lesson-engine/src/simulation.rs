//! Deterministic playback on a manual clock
//!
//! [`Simulation`] steps a [`ManualClock`] from one timer deadline to the next,
//! so a whole lesson can be played in microseconds with exact timestamps.

use crate::clock::{Clock, ManualClock};
use crate::engine::PlaybackEngine;
use crate::events::{CompletionSummary, EngineEvent};
use crate::EngineResult;
use lessonflow_config::PlayerConfig;
use lessonflow_core::{Duration, Lesson, Timestamp};
use serde::Serialize;

/// An event and the clock time it was collected at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    pub at: Timestamp,
    #[serde(flatten)]
    pub event: EngineEvent,
}

pub struct Simulation {
    clock: ManualClock,
    engine: PlaybackEngine,
    log: Vec<TimedEvent>,
}

impl Simulation {
    pub fn new(config: PlayerConfig) -> EngineResult<Self> {
        let clock = ManualClock::new();
        let engine = PlaybackEngine::with_config(clock.clone(), config)?;
        Ok(Self {
            clock,
            engine,
            log: Vec::new(),
        })
    }

    /// Creates a simulation and loads `lesson` at time zero
    pub fn with_lesson(lesson: Lesson, config: PlayerConfig) -> EngineResult<Self> {
        let mut simulation = Self::new(config)?;
        simulation.engine.load(lesson)?;
        simulation.collect();
        Ok(simulation)
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Direct engine access for host actions.
    ///
    /// Events produced this way are stamped on the next [`advance`](Self::advance)
    /// or [`collect`](Self::collect).
    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Moves time forward by `by`, firing every timer on the way.
    ///
    /// Returns the events produced, each stamped with the deadline that
    /// produced it.
    pub fn advance(&mut self, by: Duration) -> Vec<TimedEvent> {
        let target = self.clock.now() + by;
        let first_new = self.log.len();
        self.collect();

        while let Some(deadline) = self.engine.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            self.engine.fire_due_timers();
            self.collect();
        }

        self.clock.set(target);
        self.log[first_new..].to_vec()
    }

    /// Advances until the lesson completes or `limit` passes
    pub fn run_until_complete(&mut self, limit: Duration) -> Option<CompletionSummary> {
        let give_up = self.clock.now() + limit;
        self.collect();

        while !self.engine.is_completed() {
            match self.engine.next_deadline() {
                Some(deadline) if deadline <= give_up => {
                    self.clock.set(deadline);
                    self.engine.fire_due_timers();
                    self.collect();
                }
                _ => break,
            }
        }

        self.log.iter().rev().find_map(|timed| match &timed.event {
            EngineEvent::LessonCompleted(summary) => Some(summary.clone()),
            _ => None,
        })
    }

    /// Moves pending engine events into the log at the current time
    pub fn collect(&mut self) -> usize {
        let at = self.clock.now();
        let events = self.engine.drain_events();
        let count = events.len();
        self.log
            .extend(events.into_iter().map(|event| TimedEvent { at, event }));
        count
    }

    /// Everything collected since the simulation started
    pub fn log(&self) -> &[TimedEvent] {
        &self.log
    }
}
