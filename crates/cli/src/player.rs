// FILE: crates/cli/src/player.rs

use crate::render::{text_renderers, SlideText};
use anyhow::{Context, Result};
use console::{style, Key, Term};
use lesson_engine::{
    runtime, EngineEvent, EngineHandle, EngineRuntime, Lesson, PlaybackSnapshot, PlayerConfig,
    RendererRegistry, SlideIndicator, SlidePhase, SlideView,
};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;
use tokio::time::interval;

const REDRAW_INTERVAL: StdDuration = StdDuration::from_millis(250);

/// Terminal options that are not part of the engine config
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub muted: bool,
    pub bar_width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Next,
    Previous,
    JumpTo(usize),
    ToggleAutoplay,
    ToggleAudio,
    ToggleNarration,
    RestartNarration,
    Quit,
}

/// Maps a key press to a player action
pub fn action_for_key(key: &Key) -> Option<PlayerAction> {
    match key {
        Key::Char('n') | Key::ArrowRight => Some(PlayerAction::Next),
        Key::Char('p') | Key::ArrowLeft => Some(PlayerAction::Previous),
        Key::Char('0') => Some(PlayerAction::JumpTo(9)),
        Key::Char(c @ '1'..='9') => c
            .to_digit(10)
            .map(|d| PlayerAction::JumpTo(d as usize - 1)),
        Key::Char('a') => Some(PlayerAction::ToggleAutoplay),
        Key::Char('m') => Some(PlayerAction::ToggleAudio),
        Key::Char(' ') => Some(PlayerAction::ToggleNarration),
        Key::Char('r') => Some(PlayerAction::RestartNarration),
        Key::Char('q') | Key::Escape => Some(PlayerAction::Quit),
        _ => None,
    }
}

pub async fn start_session(lesson: Lesson, config: PlayerConfig, options: SessionOptions) -> Result<()> {
    let lesson = Arc::new(lesson);
    let mut engine = runtime::spawn(config).context("Failed to start lesson engine")?;

    engine
        .handle
        .load(lesson.clone())
        .await
        .context("Failed to load lesson")?;
    if options.muted {
        engine.handle.set_audio_enabled(false).await?;
    }

    let term = Term::stdout();
    if term.hide_cursor().is_err() {
        eprintln!("Warning: Failed to hide cursor");
    }

    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let reader = term.clone();
    // read_key blocks; a plain thread does not hold up runtime shutdown
    std::thread::spawn(move || {
        while let Ok(key) = reader.read_key() {
            if key_tx.send(key).is_err() {
                break;
            }
        }
    });

    let result = player_loop(&term, &mut engine, key_rx, &lesson, options.bar_width).await;

    if let Err(e) = engine.handle.shutdown().await {
        log::debug!("Engine already stopped: {}", e);
    }
    let _ = term.show_cursor();

    result
}

async fn player_loop(
    term: &Term,
    engine: &mut EngineRuntime,
    mut keys: mpsc::UnboundedReceiver<Key>,
    lesson: &Lesson,
    bar_width: usize,
) -> Result<()> {
    let registry = text_renderers();
    let mut redraw = interval(REDRAW_INTERVAL);
    let mut notice: Option<String> = None;
    let mut snapshot = engine.handle.snapshot().await?;

    loop {
        tokio::select! {
            key = keys.recv() => match key.as_ref().and_then(action_for_key) {
                Some(PlayerAction::Quit) => break,
                Some(action) => {
                    if let Some(current) = &snapshot {
                        notice = apply_action(&engine.handle, action, current).await?;
                    }
                }
                None if key.is_none() => break,
                None => {}
            },
            event = engine.events.recv() => match event {
                Some(EngineEvent::LessonCompleted(summary)) => {
                    log::info!(
                        "Lesson completed: {} slides in {}",
                        summary.completed_count,
                        summary.total_elapsed.as_clock()
                    );
                }
                Some(EngineEvent::SlideChanged { .. }) => notice = None,
                Some(EngineEvent::NarrationProgress { .. }) => {}
                None => break,
            },
            _ = redraw.tick() => {}
        }

        snapshot = engine.handle.snapshot().await?;
        if let Some(current) = &snapshot {
            term.clear_screen().context("Failed to clear screen")?;
            for line in render_screen(current, lesson, &registry, bar_width, notice.as_deref()) {
                term.write_line(&line).context("Failed to write player screen")?;
            }
        }
    }

    Ok(())
}

/// Sends the command for `action`; returns a message to show when it was refused
async fn apply_action(
    handle: &EngineHandle,
    action: PlayerAction,
    snapshot: &PlaybackSnapshot,
) -> Result<Option<String>> {
    match action {
        PlayerAction::Next => handle.next().await?,
        PlayerAction::Previous => handle.previous().await?,
        PlayerAction::JumpTo(index) => {
            if let Err(e) = handle.jump_to(index).await {
                return Ok(Some(e.to_string()));
            }
        }
        PlayerAction::ToggleAutoplay => handle.set_autoplay(!snapshot.autoplay_enabled).await?,
        PlayerAction::ToggleAudio => handle.set_audio_enabled(!snapshot.audio_enabled).await?,
        PlayerAction::ToggleNarration => {
            if snapshot.narration.is_playing {
                handle.pause_narration().await?
            } else {
                handle.resume_narration().await?
            }
        }
        PlayerAction::RestartNarration => handle.restart_narration().await?,
        PlayerAction::Quit => {}
    }
    Ok(None)
}

/// Builds every line of the player screen for one snapshot
pub fn render_screen(
    snapshot: &PlaybackSnapshot,
    lesson: &Lesson,
    registry: &RendererRegistry<SlideText>,
    bar_width: usize,
    notice: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        format!("\n  {}", style(&snapshot.lesson_title).bold().cyan()),
        format!(
            "  Slide {} of {}",
            snapshot.current_index + 1,
            snapshot.total_slides
        ),
        String::new(),
    ];

    if let Some(slide) = lesson.slide(snapshot.current_index) {
        let view = SlideView {
            slide,
            index: snapshot.current_index,
            total: snapshot.total_slides,
        };
        lines.extend(registry.render(&view).into_iter().map(|l| format!("  {}", l)));
    }

    if snapshot.audio_enabled && !snapshot.script_words.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}", narration_line(snapshot)));
    }

    lines.push(String::new());
    if let Some(progress) = &snapshot.progress {
        lines.push(format!("  {}", progress_bar(progress.percent, bar_width)));
        lines.push(format!("  {}", indicator_row(&progress.indicators)));
    }
    lines.push(format!(
        "  Time on slide: {}   Total: {}",
        snapshot.time_on_slide.as_clock(),
        snapshot.total_elapsed.as_clock()
    ));
    lines.push(format!(
        "  Autoplay: {}   Audio: {}   {}",
        on_off(snapshot.autoplay_enabled),
        on_off(snapshot.audio_enabled),
        phase_label(snapshot.phase)
    ));

    if let Some(notice) = notice {
        lines.push(format!("  {}", style(notice).yellow()));
    }

    lines.push(String::new());
    lines.push("  Controls:".to_string());
    lines.push("    n/→  p/←  - Next / previous slide".to_string());
    lines.push("    1-9, 0    - Jump to slide".to_string());
    lines.push("    a  m      - Autoplay / audio".to_string());
    lines.push("    Space  r  - Pause narration / restart narration".to_string());
    lines.push("    Q/Esc     - Quit".to_string());
    lines
}

/// The script with the words spoken so far highlighted
fn narration_line(snapshot: &PlaybackSnapshot) -> String {
    let spoken = snapshot.narration.word_index.min(snapshot.script_words.len());
    let (said, unsaid) = snapshot.script_words.split_at(spoken);
    let said = said.join(" ");
    let unsaid = unsaid.join(" ");

    match (said.is_empty(), unsaid.is_empty()) {
        (true, _) => style(unsaid).dim().to_string(),
        (false, true) => style(said).bold().to_string(),
        (false, false) => format!("{} {}", style(said).bold(), style(unsaid).dim()),
    }
}

fn progress_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:.0}%",
        "=".repeat(filled),
        " ".repeat(width - filled),
        percent
    )
}

fn indicator_row(indicators: &[SlideIndicator]) -> String {
    indicators
        .iter()
        .map(|indicator| match indicator {
            SlideIndicator::Current => "●",
            SlideIndicator::Completed => "✓",
            SlideIndicator::Available => "○",
            SlideIndicator::Locked => "·",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn on_off(enabled: bool) -> String {
    if enabled {
        style("on").green().to_string()
    } else {
        style("off").dim().to_string()
    }
}

fn phase_label(phase: SlidePhase) -> String {
    match phase {
        SlidePhase::Idle => style("Ready").dim().to_string(),
        SlidePhase::Narrating => style("Narrating").green().to_string(),
        SlidePhase::NarrationDone => style("Narration finished").cyan().to_string(),
        SlidePhase::Advancing => style("Advancing…").yellow().to_string(),
        SlidePhase::Completed => style("Lesson complete").green().bold().to_string(),
    }
}
