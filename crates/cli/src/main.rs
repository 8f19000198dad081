// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use lessonflow_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;
mod player;
mod render;

fn lesson_arg() -> Arg {
    Arg::new("lesson")
        .required(true)
        .value_name("LESSON")
        .help("Path to the lesson JSON file")
}

fn build_cli() -> Command {
    Command::new("lessonflow")
        .version(env!("CARGO_PKG_VERSION"))
        .author("LessonFlow Contributors")
        .about("Narrated slide lessons in the terminal")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(
            Command::new("play")
                .about("Play a lesson interactively")
                .arg(lesson_arg())
                .arg(
                    Arg::new("autoplay")
                        .short('a')
                        .long("autoplay")
                        .help("Start with autoplay on")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("mute")
                        .short('m')
                        .long("mute")
                        .help("Start with narration off")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Fast-forward a lesson with autoplay on and print the event log")
                .arg(lesson_arg())
                .arg(
                    Arg::new("limit")
                        .long("limit-secs")
                        .value_name("SECONDS")
                        .help("Give up after this much simulated time")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("3600"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print every event as a JSON line")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a lesson file and list its slides")
                .arg(lesson_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Create a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("reset").about("Overwrite the config with defaults")),
        )
}

fn config_manager(dir: Option<&String>) -> Result<ConfigManager> {
    match dir {
        Some(dir) => Ok(ConfigManager::with_directory(PathBuf::from(dir))),
        None => ConfigManager::new().context("Failed to locate config directory"),
    }
}

fn load_config(manager: &ConfigManager) -> Config {
    manager.load_with_env_overrides().unwrap_or_else(|e| {
        eprintln!("Config error: {}, using defaults", e);
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(matches.get_one::<String>("config-dir"))?;
    let config = load_config(&manager);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();
    console::set_colors_enabled(config.app.color_output);

    match matches.subcommand() {
        Some(("play", sub_matches)) => commands::play_lesson(sub_matches, config).await,
        Some(("simulate", sub_matches)) => commands::simulate_lesson(sub_matches, &config),
        Some(("validate", sub_matches)) => commands::validate_lesson(sub_matches, &config),
        Some(("config", sub_matches)) => commands::config_command(&manager, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
