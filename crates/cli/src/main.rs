// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use chronicle_config::ConfigManager;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

mod commands;

use commands::Session;

fn build_cli() -> Command {
    Command::new("chronicle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load, inspect and validate Chronicle series content")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml and preferences.toml")
                .global(true),
        )
        .arg(
            Arg::new("location")
                .short('l')
                .long("location")
                .value_name("URL_OR_DIR")
                .help("Content location, overriding the configured one")
                .global(true),
        )
        .subcommand(
            Command::new("load")
                .about("Load all content and report progress")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the loaded bundle as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("validate").about("Load all content and check its structure"))
        .subcommand(Command::new("books").about("List books in series order"))
        .subcommand(
            Command::new("chapters")
                .about("List chapters in reading order")
                .arg(
                    Arg::new("book")
                        .short('b')
                        .long("book")
                        .value_name("N")
                        .help("Only chapters of book N")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                ),
        )
        .subcommand(Command::new("characters").about("List characters and their relationships"))
        .subcommand(Command::new("scenes").about("List deleted scenes"))
        .subcommand(
            Command::new("prefs")
                .about("Show or change reader preferences")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show stored preferences"))
                .subcommand(
                    Command::new("set")
                        .about("Change stored preferences")
                        .arg(
                            Arg::new("premium")
                                .long("premium")
                                .value_name("BOOL")
                                .help("Unlock premium scenes")
                                .value_parser(clap::value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("book")
                                .long("book")
                                .value_name("N")
                                .help("Current book")
                                .value_parser(clap::value_parser!(u32).range(1..)),
                        )
                        .arg(
                            Arg::new("chapter")
                                .long("chapter")
                                .value_name("ID")
                                .help("Current chapter id")
                                .conflicts_with("clear-chapter"),
                        )
                        .arg(
                            Arg::new("clear-chapter")
                                .long("clear-chapter")
                                .help("Forget the current chapter")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file if none exists"))
                .subcommand(Command::new("show").about("Show the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file path")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate configuration")?;

    let mut config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;
    if let Some(location) = matches.get_one::<String>("location") {
        config.content.location = location.clone();
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_str()),
    )
    .init();

    let session = Session::new(manager, config);

    match matches.subcommand() {
        Some(("load", sub_matches)) => session.load(sub_matches.get_flag("json")).await,
        Some(("validate", _)) => session.validate().await,
        Some(("books", _)) => session.books().await,
        Some(("chapters", sub_matches)) => {
            session
                .chapters(sub_matches.get_one::<u32>("book").copied())
                .await
        }
        Some(("characters", _)) => session.characters().await,
        Some(("scenes", _)) => session.scenes().await,
        Some(("prefs", sub_matches)) => match sub_matches.subcommand() {
            Some(("set", set_matches)) => session.set_preferences(set_matches),
            _ => session.show_preferences(),
        },
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => session.init_config(),
            Some(("path", _)) => session.config_path(),
            _ => session.show_config(),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
