//! Integration tests for lesson playback
//!
//! These tests drive the PlaybackEngine through the Simulation harness so
//! every timer fires at an exact, reproducible timestamp.

use lesson_engine::{
    Duration, EngineError, EngineEvent, Lesson, LessonSettings, NavigationError, PlayerConfig,
    RendererRegistry, Simulation, Slide, SlideIndicator, SlideKind, SlidePhase, SlideView,
    TimedEvent, Timestamp,
};

fn at(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

fn autoplay_on() -> PlayerConfig {
    PlayerConfig {
        autoplay_on_start: true,
        ..PlayerConfig::default()
    }
}

fn manual_lesson(slides: usize) -> Lesson {
    Lesson::new(
        "Manual",
        (0..slides)
            .map(|i| Slide::new(format!("Slide {}", i), SlideKind::Content))
            .collect(),
    )
}

fn slide_changes(events: &[TimedEvent]) -> Vec<(Timestamp, usize)> {
    events
        .iter()
        .filter_map(|timed| match timed.event {
            EngineEvent::SlideChanged { index, .. } => Some((timed.at, index)),
            _ => None,
        })
        .collect()
}

fn completions(events: &[TimedEvent]) -> usize {
    events
        .iter()
        .filter(|timed| matches!(timed.event, EngineEvent::LessonCompleted(_)))
        .count()
}

#[test]
fn test_narrated_intro_then_dwell_slide() {
    let lesson = Lesson::new(
        "Scenario",
        vec![
            Slide::new("Welcome", SlideKind::Intro)
                .with_script("one two three four five six seven eight nine ten"),
            Slide::new("Details", SlideKind::Content),
        ],
    );
    let mut sim = Simulation::with_lesson(lesson, autoplay_on()).expect("Failed to load");

    // 10 words at 2.5 words/sec take 4s, then the 2s post-narration pause
    let events = sim.advance(Duration::from_seconds(6));
    let progress: Vec<_> = events
        .iter()
        .filter(|timed| matches!(timed.event, EngineEvent::NarrationProgress { .. }))
        .map(|timed| timed.at)
        .collect();
    assert_eq!(progress.len(), 10);
    assert_eq!(progress.first(), Some(&at(400)));
    assert_eq!(progress.last(), Some(&at(4_000)));
    assert_eq!(slide_changes(&events), vec![(at(6_000), 1)]);

    // The empty-script slide dwells for the default 30s
    let events = sim.advance(Duration::from_millis(29_999));
    assert_eq!(completions(&events), 0);

    let summary = sim
        .run_until_complete(Duration::from_seconds(1))
        .expect("Lesson should complete");
    assert_eq!(sim.now(), at(36_000));
    assert_eq!(summary.total_slides, 2);
    assert_eq!(summary.completed_count, 2);
    assert_eq!(summary.total_elapsed, Duration::from_seconds(36));
    assert_eq!(completions(sim.log()), 1);
}

#[test]
fn test_four_words_at_two_per_second() {
    let settings = LessonSettings {
        narration_rate_words_per_sec: 2.0,
        ..LessonSettings::default()
    };
    let lesson = Lesson::new(
        "Words",
        vec![Slide::new("Only", SlideKind::Concept).with_script("a b c d")],
    )
    .with_settings(settings);
    let mut sim = Simulation::with_lesson(lesson, PlayerConfig::default()).expect("Failed to load");

    let events = sim.advance(Duration::from_seconds(10));
    assert_eq!(
        events,
        vec![
            TimedEvent {
                at: at(500),
                event: EngineEvent::NarrationProgress { word_index: 1, percent: 25.0 },
            },
            TimedEvent {
                at: at(1_000),
                event: EngineEvent::NarrationProgress { word_index: 2, percent: 50.0 },
            },
            TimedEvent {
                at: at(1_500),
                event: EngineEvent::NarrationProgress { word_index: 3, percent: 75.0 },
            },
            TimedEvent {
                at: at(2_000),
                event: EngineEvent::NarrationProgress { word_index: 4, percent: 100.0 },
            },
        ]
    );

    let snapshot = sim.engine().snapshot().expect("Lesson loaded");
    assert!(snapshot.narration.is_finished);
    assert!(!snapshot.narration.is_playing);
    assert_eq!(snapshot.phase, SlidePhase::NarrationDone);
}

#[test]
fn test_n_next_calls_complete_exactly_once() {
    let mut sim =
        Simulation::with_lesson(manual_lesson(5), PlayerConfig::default()).expect("Failed to load");

    for _ in 0..5 {
        sim.engine_mut().next();
    }
    assert!(sim.engine().is_completed());

    for _ in 0..3 {
        sim.engine_mut().next();
    }
    sim.collect();

    assert_eq!(completions(sim.log()), 1);
    assert_eq!(slide_changes(sim.log()).len(), 5);
}

#[test]
fn test_jump_reachability() {
    for target in 0..=5 {
        let mut sim = Simulation::with_lesson(manual_lesson(5), PlayerConfig::default())
            .expect("Failed to load");
        sim.engine_mut().next();
        sim.engine_mut().next();

        let before = sim.engine().snapshot();
        let result = sim.engine_mut().jump_to(target);

        match target {
            0..=2 => {
                assert!(result.is_ok(), "slide {} should be reachable", target);
                assert_eq!(sim.engine().state().map(|s| s.current_index()), Some(target));
            }
            3 | 4 => {
                assert_eq!(
                    result,
                    Err(EngineError::Navigation(NavigationError::Unreachable {
                        index: target,
                        current: 2
                    }))
                );
                assert_eq!(sim.engine().snapshot(), before);
            }
            _ => {
                assert!(matches!(
                    result,
                    Err(EngineError::Navigation(NavigationError::OutOfBounds { .. }))
                ));
                assert_eq!(sim.engine().snapshot(), before);
            }
        }
    }
}

#[test]
fn test_completed_slides_stay_reachable_after_going_back() {
    let mut sim =
        Simulation::with_lesson(manual_lesson(5), PlayerConfig::default()).expect("Failed to load");
    sim.engine_mut().next();
    sim.engine_mut().next();
    sim.engine_mut().jump_to(0).expect("Should jump back");

    // Slide 1 was completed, slide 2 was only visited
    assert!(sim.engine_mut().jump_to(1).is_ok());
    assert_eq!(
        sim.engine_mut().jump_to(2),
        Err(EngineError::Navigation(NavigationError::Unreachable {
            index: 2,
            current: 1
        }))
    );

    let progress = sim
        .engine()
        .snapshot()
        .and_then(|s| s.progress)
        .expect("Progress shown by default");
    assert_eq!(
        progress.indicators,
        vec![
            SlideIndicator::Completed,
            SlideIndicator::Current,
            SlideIndicator::Locked,
            SlideIndicator::Locked,
            SlideIndicator::Locked,
        ]
    );
}

#[test]
fn test_disabling_autoplay_mid_countdown() {
    let mut sim = Simulation::with_lesson(manual_lesson(3), autoplay_on()).expect("Failed to load");

    sim.advance(Duration::from_seconds(10));
    assert_eq!(sim.engine().phase(), SlidePhase::Advancing);

    sim.engine_mut().set_autoplay(false);
    let events = sim.advance(Duration::from_seconds(600));

    assert!(slide_changes(&events).is_empty());
    assert_eq!(sim.engine().next_deadline(), None);
    assert_eq!(sim.engine().phase(), SlidePhase::Idle);
}

#[test]
fn test_disabling_autoplay_during_post_narration_delay() {
    let lesson = Lesson::new(
        "Narrated",
        vec![
            Slide::new("Welcome", SlideKind::Intro)
                .with_script("one two three four five six seven eight nine ten"),
            Slide::new("Details", SlideKind::Content),
        ],
    );
    let mut sim = Simulation::with_lesson(lesson, autoplay_on()).expect("Failed to load");

    // Narration ends at 4s; the advance waits for the 2s pause after it
    sim.advance(Duration::from_millis(4_500));
    let snapshot = sim.engine().snapshot().expect("Lesson loaded");
    assert!(snapshot.narration.is_finished);
    assert_eq!(snapshot.advance_at, Some(at(6_000)));

    sim.engine_mut().set_autoplay(false);
    let events = sim.advance(Duration::from_seconds(600));

    assert!(slide_changes(&events).is_empty());
    assert_eq!(sim.engine().next_deadline(), None);
    assert_eq!(sim.engine().snapshot().expect("Lesson loaded").advance_at, None);
}

#[test]
fn test_reload_during_narration_drops_old_progress() {
    let narrated = Lesson::new(
        "Narrated",
        vec![Slide::new("Welcome", SlideKind::Intro)
            .with_script("one two three four five six seven eight nine ten")],
    );
    let mut sim = Simulation::with_lesson(narrated, autoplay_on()).expect("Failed to load");
    sim.advance(Duration::from_millis(1_000));

    sim.engine_mut().load(manual_lesson(2)).expect("Failed to reload");
    let events = sim.advance(Duration::from_seconds(10));

    assert_eq!(slide_changes(&events), vec![(at(1_000), 0)]);
    assert!(events
        .iter()
        .all(|timed| !matches!(timed.event, EngineEvent::NarrationProgress { .. })));
}

#[test]
fn test_enabling_autoplay_counts_time_already_spent() {
    let mut sim =
        Simulation::with_lesson(manual_lesson(3), PlayerConfig::default()).expect("Failed to load");

    sim.advance(Duration::from_seconds(20));
    sim.engine_mut().set_autoplay(true);
    sim.engine_mut().set_autoplay(true);

    let events = sim.advance(Duration::from_seconds(10));
    assert_eq!(slide_changes(&events), vec![(at(30_000), 1)]);
}

#[test]
fn test_reload_during_countdown_discards_old_timers() {
    let first = Lesson::new(
        "First",
        vec![
            Slide::new("A", SlideKind::Intro).with_duration(Duration::from_seconds(5)),
            Slide::new("B", SlideKind::Conclusion).with_duration(Duration::from_seconds(5)),
        ],
    );
    let second = manual_lesson(3);

    let mut sim = Simulation::with_lesson(first, autoplay_on()).expect("Failed to load");
    sim.advance(Duration::from_seconds(3));

    sim.engine_mut().load(second).expect("Failed to reload");
    let events = sim.advance(Duration::from_seconds(29));

    assert_eq!(slide_changes(&events), vec![(at(3_000), 0)]);
    assert_eq!(sim.engine().lesson().map(|l| l.title.as_str()), Some("Manual"));

    // Only the new lesson's 30s dwell remains
    assert_eq!(sim.engine().next_deadline(), Some(at(33_000)));
}

#[test]
fn test_pause_twice_keeps_word_index() {
    let settings = LessonSettings {
        narration_rate_words_per_sec: 2.0,
        ..LessonSettings::default()
    };
    let lesson = Lesson::new(
        "Pause",
        vec![Slide::new("Only", SlideKind::Concept).with_script("a b c d e f")],
    )
    .with_settings(settings);
    let mut sim = Simulation::with_lesson(lesson, PlayerConfig::default()).expect("Failed to load");

    sim.advance(Duration::from_seconds(1));
    assert!(sim.engine_mut().pause_narration());
    assert!(!sim.engine_mut().pause_narration());
    sim.advance(Duration::from_seconds(30));

    let narration = sim.engine().snapshot().expect("Lesson loaded").narration;
    assert_eq!(narration.word_index, 2);
    assert!(!narration.is_playing);

    assert!(sim.engine_mut().resume_narration());
    sim.advance(Duration::from_seconds(2));
    let narration = sim.engine().snapshot().expect("Lesson loaded").narration;
    assert!(narration.is_finished);
}

#[test]
fn test_muting_switches_to_remaining_dwell() {
    let lesson = Lesson::new(
        "Mute",
        vec![
            Slide::new("Talky", SlideKind::Intro)
                .with_script("a very long script that keeps going for quite a while"),
            Slide::new("Next", SlideKind::Conclusion),
        ],
    );
    let mut sim = Simulation::with_lesson(lesson, autoplay_on()).expect("Failed to load");

    sim.advance(Duration::from_seconds(1));
    sim.engine_mut().set_audio_enabled(false);

    let snapshot = sim.engine().snapshot().expect("Lesson loaded");
    assert_eq!(snapshot.narration.word_index, 0);
    assert_eq!(snapshot.advance_at, Some(at(30_000)));

    let events = sim.advance(Duration::from_seconds(29));
    assert_eq!(slide_changes(&events), vec![(at(30_000), 1)]);
    assert!(events
        .iter()
        .all(|timed| !matches!(timed.event, EngineEvent::NarrationProgress { .. })));
}

#[test]
fn test_autoplay_enabled_after_narration_finished() {
    let settings = LessonSettings {
        narration_rate_words_per_sec: 2.0,
        ..LessonSettings::default()
    };
    let lesson = Lesson::new(
        "Late autoplay",
        vec![
            Slide::new("One", SlideKind::Intro).with_script("a b c d"),
            Slide::new("Two", SlideKind::Conclusion),
        ],
    )
    .with_settings(settings);
    let mut sim = Simulation::with_lesson(lesson, PlayerConfig::default()).expect("Failed to load");

    sim.advance(Duration::from_seconds(3));
    sim.engine_mut().set_autoplay(true);

    let events = sim.advance(Duration::from_seconds(5));
    assert_eq!(slide_changes(&events), vec![(at(5_000), 1)]);
}

#[test]
fn test_going_back_does_not_rerun_narration_or_autoplay() {
    let lesson = Lesson::new(
        "Back",
        vec![
            Slide::new("One", SlideKind::Intro).with_script("a b c"),
            Slide::new("Two", SlideKind::Concept).with_script("d e f"),
            Slide::new("Three", SlideKind::Conclusion),
        ],
    );
    let mut sim = Simulation::with_lesson(lesson, autoplay_on()).expect("Failed to load");

    sim.engine_mut().next();
    sim.engine_mut().previous();

    let snapshot = sim.engine().snapshot().expect("Lesson loaded");
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.phase, SlidePhase::Idle);
    assert_eq!(snapshot.completed_indices, vec![0]);

    sim.collect();
    let events = sim.advance(Duration::from_seconds(120));
    assert!(events.is_empty());

    // The learner can still replay it by hand
    assert!(sim.engine_mut().restart_narration());
    assert_eq!(sim.engine().phase(), SlidePhase::Narrating);
}

#[test]
fn test_config_dwell_override() {
    let config = PlayerConfig {
        autoplay_on_start: true,
        auto_play_speed_ms: Some(5_000),
        ..PlayerConfig::default()
    };
    let mut sim = Simulation::with_lesson(manual_lesson(2), config).expect("Failed to load");

    let summary = sim
        .run_until_complete(Duration::from_seconds(60))
        .expect("Lesson should complete");
    assert_eq!(summary.total_elapsed, Duration::from_seconds(10));
}

#[test]
fn test_time_records() {
    let mut sim =
        Simulation::with_lesson(manual_lesson(3), PlayerConfig::default()).expect("Failed to load");

    sim.advance(Duration::from_seconds(4));
    sim.engine_mut().next();
    sim.advance(Duration::from_seconds(3));
    sim.engine_mut().previous();
    sim.advance(Duration::from_seconds(2));

    let snapshot = sim.engine().snapshot().expect("Lesson loaded");
    assert_eq!(snapshot.time_on_slide, Duration::from_seconds(2));
    assert_eq!(snapshot.total_elapsed, Duration::from_seconds(9));
    assert_eq!(snapshot.total_elapsed.as_clock(), "0:09");

    let times = sim.engine().time_per_slide();
    assert_eq!(times.get(&0), Some(&Duration::from_seconds(6)));
    assert_eq!(times.get(&1), Some(&Duration::from_seconds(3)));
    assert_eq!(times.get(&2), None);
}

#[test]
fn test_render_current_slide_with_fallback() {
    let lesson = Lesson::new(
        "Render",
        vec![
            Slide::new("Hello", SlideKind::Intro),
            Slide::new("Odd", SlideKind::from("timeline")),
        ],
    );
    let mut sim = Simulation::with_lesson(lesson, PlayerConfig::default()).expect("Failed to load");

    let registry = RendererRegistry::new(|view: &SlideView<'_>| {
        format!("[{}/{}] {}", view.index + 1, view.total, view.slide.title)
    })
    .with(SlideKind::Intro, |view: &SlideView<'_>| {
        format!("Welcome: {}", view.slide.title)
    });

    assert_eq!(
        sim.engine().render_current(&registry).as_deref(),
        Some("Welcome: Hello")
    );
    sim.engine_mut().next();
    assert_eq!(
        sim.engine().render_current(&registry).as_deref(),
        Some("[2/2] Odd")
    );
}
