// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use radiosync_config::{ConfigManager, LogLevel};
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("radiosync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keeps a Spotify playlist in step with what an NRK radio channel is playing")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("server")
                .about("Sync the channel into the playlist until interrupted")
                .arg(
                    Arg::new("token-file")
                        .short('f')
                        .long("token-file")
                        .value_name("FILE")
                        .help("Token file to use [default: .token.json]")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MINUTES")
                        .help("Minutes between syncs [default: 5]")
                        .value_parser(value_parser!(u64).range(1..=1440)),
                )
                .arg(
                    Arg::new("adaptive")
                        .short('a')
                        .long("adaptive")
                        .help("Time the next sync by when the queued tracks end")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("delete-evicted")
                        .short('d')
                        .long("delete-evicted")
                        .help("Remove tracks from the playlist when they leave the cache")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("cache-size")
                        .short('c')
                        .long("cache-size")
                        .value_name("MAX")
                        .help("Number of recent tracks to remember [default: 100]")
                        .value_parser(value_parser!(u64).range(1..=10_000)),
                )
                .arg(
                    Arg::new("name")
                        .value_name("NAME")
                        .help("Playlist name"),
                )
                .arg(
                    Arg::new("radio-id")
                        .value_name("RADIO_ID")
                        .help("Channel ID, see `radiosync list`"),
                ),
        )
        .subcommand(Command::new("list").about("List the available radio IDs"))
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("validate").about("Check the config file for errors")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    let manager = match matches.get_one::<PathBuf>("config") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    };
    manager.context("Failed to locate config directory")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;

    // A broken file still lets `config init` and `config validate` run
    let loaded = manager.load_with_env_overrides();
    let log_level = loaded
        .as_ref()
        .map(|config| config.app.log_level)
        .unwrap_or(LogLevel::Info);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level.as_str()))
        .init();

    let config = || {
        loaded
            .as_ref()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to load {}", manager.config_path().display()))
    };

    match matches.subcommand() {
        Some(("server", sub_matches)) => commands::run_server(config()?, sub_matches).await,
        Some(("list", _)) => commands::list_channels(),
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => commands::config_show(config()?),
            Some(("validate", _)) => commands::config_validate(&manager),
            _ => Ok(()),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
