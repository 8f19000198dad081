//! Autoplay scheduling
//!
//! A slide advances either a fixed pause after its narration completes or,
//! when there is nothing to narrate, after a dwell time. At most one advance
//! timer exists at any moment; arming again replaces it.

use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use lessonflow_core::{Duration, Slide, Timestamp};
use serde::Serialize;

/// Pause between narration completing and the automatic advance
pub const NARRATION_COMPLETE_DELAY_MS: u64 = 2_000;

/// What gates the automatic advance of a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceTrigger {
    /// Advance after narration completes plus the fixed delay
    Narration,
    /// Advance once the slide has been shown this long
    Dwell(Duration),
}

impl AdvanceTrigger {
    /// Narration gates the advance when audio is on and there is a script
    pub fn for_slide(slide: &Slide, audio_enabled: bool, default_dwell: Duration) -> Self {
        if audio_enabled && slide.has_narration() {
            AdvanceTrigger::Narration
        } else {
            AdvanceTrigger::Dwell(slide.dwell(default_dwell))
        }
    }
}

/// Marker returned when an advance timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceRequested;

#[derive(Debug, Default)]
pub struct AutoplayScheduler {
    armed: Option<AdvanceTrigger>,
    pending: Option<TimerId>,
}

impl AutoplayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the advance for the current slide.
    ///
    /// Any previous advance timer is cancelled first. A dwell trigger is
    /// scheduled right away, minus the time already spent on the slide. A
    /// narration trigger waits for [`narration_completed`](Self::narration_completed).
    pub fn arm(
        &mut self,
        trigger: AdvanceTrigger,
        autoplay_enabled: bool,
        elapsed_on_slide: Duration,
        now: Timestamp,
        timers: &mut TimerQueue,
    ) {
        self.disarm(timers);
        if !autoplay_enabled {
            return;
        }

        self.armed = Some(trigger);
        if let AdvanceTrigger::Dwell(dwell) = trigger {
            let remaining = dwell.saturating_sub(elapsed_on_slide);
            self.pending = Some(timers.schedule(now + remaining, TimerKind::Dwell));
            log::debug!("Autoplay armed: advancing in {}", remaining);
        } else {
            log::debug!("Autoplay armed: waiting for narration");
        }
    }

    /// Schedules the delayed advance if the slide is waiting on narration
    pub fn narration_completed(&mut self, now: Timestamp, timers: &mut TimerQueue) -> bool {
        if self.armed != Some(AdvanceTrigger::Narration) || self.pending.is_some() {
            return false;
        }
        let delay = Duration::from_millis(NARRATION_COMPLETE_DELAY_MS);
        self.pending = Some(timers.schedule(now + delay, TimerKind::AdvanceDelay));
        log::debug!("Narration complete, advancing in {}", delay);
        true
    }

    /// Cancels any pending advance and forgets the trigger
    pub fn disarm(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.armed = None;
    }

    /// Handles a fired advance timer. Timers from an earlier arming are ignored.
    pub fn on_timer(&mut self, fired: &FiredTimer) -> Option<AdvanceRequested> {
        if self.pending != Some(fired.id) {
            log::warn!("Ignoring stale advance timer {}", fired.id);
            return None;
        }
        self.pending = None;
        self.armed = None;
        Some(AdvanceRequested)
    }

    pub fn armed_trigger(&self) -> Option<AdvanceTrigger> {
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonflow_core::SlideKind;

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_trigger_for_slide() {
        let default_dwell = Duration::from_seconds(30);
        let narrated = Slide::new("Intro", SlideKind::Intro).with_script("hello there");
        let silent = Slide::new("Chart", SlideKind::Content);
        let timed = Slide::new("Quote", SlideKind::Content).with_duration(Duration::from_seconds(5));

        assert_eq!(
            AdvanceTrigger::for_slide(&narrated, true, default_dwell),
            AdvanceTrigger::Narration
        );
        assert_eq!(
            AdvanceTrigger::for_slide(&narrated, false, default_dwell),
            AdvanceTrigger::Dwell(default_dwell)
        );
        assert_eq!(
            AdvanceTrigger::for_slide(&silent, true, default_dwell),
            AdvanceTrigger::Dwell(default_dwell)
        );
        assert_eq!(
            AdvanceTrigger::for_slide(&timed, true, default_dwell),
            AdvanceTrigger::Dwell(Duration::from_seconds(5))
        );
    }

    #[test]
    fn test_dwell_schedules_immediately() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        autoplay.arm(
            AdvanceTrigger::Dwell(Duration::from_seconds(30)),
            true,
            Duration::ZERO,
            at(1_000),
            &mut timers,
        );
        assert_eq!(timers.next_deadline(), Some(at(31_000)));

        let fired = timers.pop_due(at(31_000)).unwrap();
        assert_eq!(autoplay.on_timer(&fired), Some(AdvanceRequested));
        assert!(!autoplay.is_armed());
    }

    #[test]
    fn test_dwell_counts_time_already_on_slide() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        autoplay.arm(
            AdvanceTrigger::Dwell(Duration::from_seconds(30)),
            true,
            Duration::from_seconds(12),
            at(12_000),
            &mut timers,
        );
        assert_eq!(timers.next_deadline(), Some(at(30_000)));
    }

    #[test]
    fn test_narration_trigger_waits_for_completion() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        autoplay.arm(AdvanceTrigger::Narration, true, Duration::ZERO, at(0), &mut timers);
        assert!(timers.is_empty());

        assert!(autoplay.narration_completed(at(4_000), &mut timers));
        assert!(!autoplay.narration_completed(at(4_000), &mut timers));
        assert_eq!(timers.next_deadline(), Some(at(6_000)));
    }

    #[test]
    fn test_disabled_autoplay_never_arms() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        autoplay.arm(
            AdvanceTrigger::Dwell(Duration::from_seconds(1)),
            false,
            Duration::ZERO,
            at(0),
            &mut timers,
        );
        assert!(!autoplay.is_armed());
        assert!(timers.is_empty());
        assert!(!autoplay.narration_completed(at(0), &mut timers));
    }

    #[test]
    fn test_rearming_replaces_pending_timer() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        let dwell = AdvanceTrigger::Dwell(Duration::from_seconds(10));
        autoplay.arm(dwell, true, Duration::ZERO, at(0), &mut timers);
        let first = autoplay.pending_timer().unwrap();
        autoplay.arm(dwell, true, Duration::ZERO, at(5_000), &mut timers);

        assert_eq!(timers.len(), 1);
        assert!(!timers.is_pending(first));
        assert_eq!(timers.next_deadline(), Some(at(15_000)));
    }

    #[test]
    fn test_disarm_cancels_pending_timer() {
        let mut timers = TimerQueue::new();
        let mut autoplay = AutoplayScheduler::new();

        autoplay.arm(
            AdvanceTrigger::Dwell(Duration::from_seconds(10)),
            true,
            Duration::ZERO,
            at(0),
            &mut timers,
        );
        let id = autoplay.pending_timer().unwrap();
        autoplay.disarm(&mut timers);

        assert!(timers.is_empty());
        let stale = FiredTimer {
            id,
            kind: TimerKind::Dwell,
            deadline: at(10_000),
        };
        assert_eq!(autoplay.on_timer(&stale), None);
    }
}
