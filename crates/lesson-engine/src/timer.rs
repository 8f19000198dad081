//! Deadline queue for every timer the engine owns
//!
//! Nothing here sleeps. Components schedule deadlines, the host advances a
//! clock, and [`TimerQueue::pop_due`] hands back the timers whose deadline
//! has passed in deadline order. Equal deadlines fire in scheduling order.

use lessonflow_core::Timestamp;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle to a scheduled timer. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// What a timer is for, used to route it when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One narration word
    NarrationTick,
    /// Post-narration pause before advancing
    AdvanceDelay,
    /// Fixed dwell on a slide without narration
    Dwell,
}

/// A timer whose deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub deadline: Timestamp,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<(Timestamp, TimerId), TimerKind>,
    deadlines: HashMap<TimerId, Timestamp>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Timestamp, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        log::trace!("Scheduled {:?} {} at {}", kind, id, deadline);
        id
    }

    /// Cancels a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => {
                self.pending.remove(&(deadline, id));
                log::trace!("Cancelled {}", id);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Timestamp> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer due at `now`
    pub fn pop_due(&mut self, now: Timestamp) -> Option<FiredTimer> {
        let (&(deadline, id), _) = self.pending.iter().next()?;
        if deadline > now {
            return None;
        }

        let kind = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some(FiredTimer { id, kind, deadline })
    }

    /// Cancels everything
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
