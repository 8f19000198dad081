//! Which slides the learner may jump to

use crate::error::NavigationError;
use crate::state::{PlaybackState, SlideIndicator};

/// Reachability rules for direct navigation
///
/// A slide is reachable when it is at or before the current slide, or when
/// it has already been completed. Sequential `next` is not subject to these
/// rules.
pub struct NavigationPolicy;

impl NavigationPolicy {
    pub fn is_reachable(target: usize, state: &PlaybackState) -> bool {
        target <= state.current_index() || state.is_completed(target)
    }

    /// Checks a direct jump to `target`
    pub fn check_jump(
        target: usize,
        state: &PlaybackState,
        total: usize,
        allow_skip: bool,
    ) -> Result<(), NavigationError> {
        if state.is_finished() {
            return Err(NavigationError::LessonCompleted);
        }
        if !allow_skip {
            return Err(NavigationError::SkipDisabled);
        }
        if target >= total {
            return Err(NavigationError::OutOfBounds {
                index: target,
                total,
            });
        }
        if !Self::is_reachable(target, state) {
            return Err(NavigationError::Unreachable {
                index: target,
                current: state.current_index(),
            });
        }
        Ok(())
    }

    pub fn indicator(index: usize, state: &PlaybackState) -> SlideIndicator {
        if index == state.current_index() && !state.is_finished() {
            SlideIndicator::Current
        } else if state.is_completed(index) {
            SlideIndicator::Completed
        } else if Self::is_reachable(index, state) {
            SlideIndicator::Available
        } else {
            SlideIndicator::Locked
        }
    }

    pub fn indicators(state: &PlaybackState, total: usize) -> Vec<SlideIndicator> {
        (0..total).map(|i| Self::indicator(i, state)).collect()
    }

    /// Percentage through the lesson, counting the current slide as reached
    pub fn progress_percent(state: &PlaybackState, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        if state.is_finished() {
            return 100.0;
        }
        ((state.current_index() + 1) as f64 / total as f64 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonflow_core::Timestamp;

    fn state_at(index: usize, completed: &[usize]) -> PlaybackState {
        let mut state = PlaybackState::new(Timestamp::ZERO, false, true);
        for &i in completed {
            state.mark_completed(i);
        }
        state.enter(index, Timestamp::ZERO);
        state
    }

    #[test]
    fn test_reachable_slides() {
        let state = state_at(2, &[0, 1, 4]);
        assert!(NavigationPolicy::is_reachable(0, &state));
        assert!(NavigationPolicy::is_reachable(2, &state));
        assert!(!NavigationPolicy::is_reachable(3, &state));
        assert!(NavigationPolicy::is_reachable(4, &state));
    }

    #[test]
    fn test_check_jump_errors() {
        let state = state_at(1, &[0]);

        assert_eq!(NavigationPolicy::check_jump(0, &state, 5, true), Ok(()));
        assert_eq!(
            NavigationPolicy::check_jump(3, &state, 5, true),
            Err(NavigationError::Unreachable { index: 3, current: 1 })
        );
        assert_eq!(
            NavigationPolicy::check_jump(9, &state, 5, true),
            Err(NavigationError::OutOfBounds { index: 9, total: 5 })
        );
        assert_eq!(
            NavigationPolicy::check_jump(0, &state, 5, false),
            Err(NavigationError::SkipDisabled)
        );
    }

    #[test]
    fn test_check_jump_after_finish() {
        let mut state = state_at(0, &[0]);
        state.finish(Timestamp::from_millis(100));
        assert_eq!(
            NavigationPolicy::check_jump(0, &state, 1, true),
            Err(NavigationError::LessonCompleted)
        );
    }

    #[test]
    fn test_indicators() {
        let state = state_at(1, &[0, 1, 3]);
        assert_eq!(
            NavigationPolicy::indicators(&state, 5),
            vec![
                SlideIndicator::Completed,
                SlideIndicator::Current,
                SlideIndicator::Locked,
                SlideIndicator::Completed,
                SlideIndicator::Locked,
            ]
        );
    }

    #[test]
    fn test_revisited_slides_show_available() {
        // Back on slide 0 after reaching slide 2 without finishing slide 1
        let mut state = state_at(2, &[0]);
        state.enter(0, Timestamp::ZERO);
        assert_eq!(NavigationPolicy::indicator(1, &state), SlideIndicator::Locked);

        let state = state_at(2, &[0]);
        assert_eq!(NavigationPolicy::indicator(1, &state), SlideIndicator::Available);
    }

    #[test]
    fn test_progress_percent() {
        let state = state_at(1, &[0]);
        assert_eq!(NavigationPolicy::progress_percent(&state, 4), 50.0);
        assert_eq!(NavigationPolicy::progress_percent(&state, 0), 0.0);
    }
}
