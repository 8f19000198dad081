// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use lesson_engine::{EngineEvent, Simulation, TimedEvent};
use lessonflow_config::{Config, ConfigManager, PlayerConfig};
use lessonflow_core::{Duration, Lesson, Validator, AUTHORED_SLIDE_RANGE};
use std::path::Path;

/// Reads and parses a lesson JSON file
pub fn load_lesson(path: &Path) -> Result<Lesson> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lesson file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse lesson file {}", path.display()))
}

/// Play a lesson interactively
pub async fn play_lesson(matches: &ArgMatches, config: Config) -> Result<()> {
    let path = lesson_path(matches)?;
    let lesson = load_lesson(path)?;

    let mut player = config.player.clone();
    if matches.get_flag("autoplay") {
        player.autoplay_on_start = true;
    }

    println!("\n{} {}", style("▶").green().bold(), style(&lesson.title).bold());
    let options = crate::player::SessionOptions {
        muted: matches.get_flag("mute"),
        bar_width: config.app.progress_bar_width,
    };
    crate::player::start_session(lesson, player, options).await
}

/// Fast-forward a lesson with autoplay on and print what happened
pub fn simulate_lesson(matches: &ArgMatches, config: &Config) -> Result<()> {
    let path = lesson_path(matches)?;
    let lesson = load_lesson(path)?;
    let limit_secs = matches.get_one::<u64>("limit").copied().unwrap_or(3_600);
    let as_json = matches.get_flag("json");

    let player = PlayerConfig {
        autoplay_on_start: true,
        ..config.player.clone()
    };
    let titles: Vec<String> = lesson.slides.iter().map(|s| s.title.clone()).collect();
    let mut simulation =
        Simulation::with_lesson(lesson, player).context("Failed to start simulation")?;
    let summary = simulation.run_until_complete(Duration::from_seconds(limit_secs));

    for timed in simulation.log() {
        if as_json {
            println!(
                "{}",
                serde_json::to_string(timed).context("Failed to serialize event")?
            );
        } else if let Some(line) = describe_event(timed, &titles) {
            println!("{}", line);
        }
    }

    match summary {
        Some(summary) => {
            if !as_json {
                println!(
                    "\n{} Completed {} of {} slides in {}",
                    style("✓").green().bold(),
                    summary.completed_count,
                    summary.total_slides,
                    summary.total_elapsed.as_clock()
                );
            }
            Ok(())
        }
        None => bail!("Lesson did not complete within {} seconds", limit_secs),
    }
}

/// Check a lesson file and print an overview
pub fn validate_lesson(matches: &ArgMatches, config: &Config) -> Result<()> {
    let path = lesson_path(matches)?;
    let lesson = load_lesson(path)?;

    if let Err(errors) = lesson.validate() {
        println!("{} {} is invalid:", style("✗").red().bold(), path.display());
        for error in &errors {
            println!("  - {}", error);
        }
        bail!("Lesson has {} validation error(s)", errors.len());
    }

    println!("{} {}", style("✓").green().bold(), style(&lesson.title).bold());
    println!("{}", "=".repeat(60));

    let rate = lesson.settings.narration_rate_words_per_sec * f64::from(config.player.audio_speed);
    for (index, slide) in lesson.slides.iter().enumerate() {
        let narration = if slide.has_narration() {
            format!(
                "{} words, ~{}",
                slide.word_count(),
                estimated_narration(slide.word_count(), rate).as_clock()
            )
        } else {
            "no narration".to_string()
        };
        println!(
            "{:>3}. [{}] {} ({})",
            index + 1,
            slide.kind,
            slide.title,
            narration
        );
        if slide.kind.is_unknown() {
            println!("     {}", style("unknown slide type, a fallback will be shown").yellow());
        }
    }

    if !lesson.is_authored_length() {
        println!(
            "\n{} Authored lessons usually have {} to {} slides, this one has {}",
            style("!").yellow().bold(),
            AUTHORED_SLIDE_RANGE.start(),
            AUTHORED_SLIDE_RANGE.end(),
            lesson.slide_count()
        );
    }

    Ok(())
}

/// Manage the configuration file
pub fn config_command(manager: &ConfigManager, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            if manager.initialize().context("Failed to create config file")? {
                println!(
                    "{} Created {}",
                    style("✓").green().bold(),
                    manager.config_path().display()
                );
            } else {
                println!("Config already exists at {}", manager.config_path().display());
            }
        }
        Some(("show", _)) => {
            let config = manager.load_with_env_overrides()?;
            println!("{}", render_config(&config)?);
            for error in manager.validate()? {
                println!("{} {}", style("!").yellow().bold(), error);
            }
        }
        Some(("path", _)) => println!("{}", manager.config_path().display()),
        Some(("reset", _)) => {
            manager.reset().context("Failed to reset config")?;
            println!("{} Config reset to defaults", style("✓").green().bold());
        }
        _ => bail!("Unknown config command"),
    }
    Ok(())
}

fn lesson_path(matches: &ArgMatches) -> Result<&Path> {
    matches
        .get_one::<String>("lesson")
        .map(Path::new)
        .ok_or_else(|| anyhow::anyhow!("Lesson file is required"))
}

fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}

/// Time to narrate `words` at `words_per_second`
fn estimated_narration(words: usize, words_per_second: f64) -> Duration {
    if words_per_second <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((words as f64 / words_per_second * 1_000.0).round() as u64)
}

/// One human-readable line per slide change or completion
fn describe_event(timed: &TimedEvent, titles: &[String]) -> Option<String> {
    let clock = Duration::from_millis(timed.at.as_millis()).as_clock();
    match &timed.event {
        EngineEvent::SlideChanged { index, total } => Some(format!(
            "[{:>5}] slide {}/{}: {}",
            clock,
            index + 1,
            total,
            titles.get(*index).map(String::as_str).unwrap_or("?")
        )),
        EngineEvent::LessonCompleted(summary) => Some(format!(
            "[{:>5}] lesson completed ({} slides)",
            clock, summary.completed_count
        )),
        EngineEvent::NarrationProgress { .. } => None,
    }
}
