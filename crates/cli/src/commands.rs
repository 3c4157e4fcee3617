// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use radiosync_config::{Config, ConfigManager};
use radiosync_content_sources::{channel_ids, NrkRadio, Spotify};
use radiosync_resilience::RetryPolicy;
use radiosync_sync_engine::{SyncConfig as EngineConfig, SyncOrchestrator};
use std::path::PathBuf;

/// Everything `server` needs once file, environment and flags are combined
#[derive(Debug)]
pub struct ServerSettings {
    pub radio_id: String,
    pub token_file: PathBuf,
    pub sync: EngineConfig,
}

/// Combines the loaded configuration with `server` flags, flags winning
pub fn server_settings(config: &Config, matches: &ArgMatches) -> Result<ServerSettings> {
    let name = matches
        .get_one::<String>("name")
        .cloned()
        .or_else(|| config.radio.name.clone())
        .ok_or_else(|| anyhow::anyhow!("Playlist name is required"))?;

    let radio_id = matches
        .get_one::<String>("radio-id")
        .cloned()
        .or_else(|| config.radio.id.clone())
        .ok_or_else(|| anyhow::anyhow!("Radio ID is required, see `radiosync list`"))?;

    let token_file = matches
        .get_one::<PathBuf>("token-file")
        .cloned()
        .unwrap_or_else(|| config.spotify.token_file.clone());

    let sync = &config.sync;
    let interval_minutes = matches
        .get_one::<u64>("interval")
        .copied()
        .unwrap_or(sync.interval_minutes);
    let cache_size = matches
        .get_one::<u64>("cache-size")
        .map(|&size| size as usize)
        .unwrap_or(sync.cache_size);

    if interval_minutes == 0 {
        bail!("Interval must be at least one minute");
    }
    if cache_size == 0 {
        bail!("Cache size must be positive");
    }

    Ok(ServerSettings {
        radio_id,
        token_file,
        sync: EngineConfig {
            playlist_name: name,
            interval: std::time::Duration::from_secs(interval_minutes * 60),
            adaptive: matches.get_flag("adaptive") || sync.adaptive,
            min_interval: sync.min_interval(),
            cache_size,
            delete_evicted: matches.get_flag("delete-evicted") || sync.delete_evicted,
            startup_policy: RetryPolicy::new(sync.startup_budget()),
            cycle_policy: RetryPolicy::new(sync.cycle_budget()),
        },
    })
}

/// Run the sync loop until Ctrl-C
pub async fn run_server(config: &Config, matches: &ArgMatches) -> Result<()> {
    let settings = server_settings(config, matches)?;

    let radio = NrkRadio::new(settings.sync.playlist_name.clone(), &settings.radio_id)
        .context("Invalid radio")?
        .with_base_url(&config.radio.feed_url);

    let spotify = Spotify::from_token_file(&settings.token_file)
        .with_context(|| format!("Failed to load token file {}", settings.token_file.display()))?
        .with_endpoints(&config.spotify.api_url, &config.spotify.accounts_url);

    log::info!(
        "Syncing {} into playlist '{}'",
        settings.radio_id,
        settings.sync.playlist_name
    );

    let mut orchestrator = SyncOrchestrator::new(settings.sync, radio, spotify);
    orchestrator
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Sync could not start")?;

    println!("{} Stopped after {} syncs", style("✓").green().bold(), orchestrator.cycles());
    Ok(())
}

/// Print the known radio IDs
pub fn list_channels() -> Result<()> {
    println!("{}", style("Available radio IDs:").bold().cyan());
    for id in channel_ids() {
        println!("  {}", id);
    }
    Ok(())
}

/// Write a default config file if none exists
pub fn config_init(manager: &ConfigManager) -> Result<()> {
    let path = manager.config_path();
    if manager.initialize().context("Failed to write config file")? {
        println!("{} Created {}", style("✓").green().bold(), path.display());
    } else {
        println!("Config file already exists at {}", path.display());
    }
    Ok(())
}

/// Print the effective configuration as TOML
pub fn config_show(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

/// Report validation errors in the config file
pub fn config_validate(manager: &ConfigManager) -> Result<()> {
    let path = manager.config_path();
    let errors = manager
        .validate()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if errors.is_empty() {
        println!("{} {} is valid", style("✓").green().bold(), path.display());
        return Ok(());
    }

    for error in &errors {
        println!("{} {}", style("✗").red().bold(), error);
    }
    bail!("{} invalid value(s) in {}", errors.len(), path.display())
}
