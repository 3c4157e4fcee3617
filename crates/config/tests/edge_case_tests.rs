//! Edge case and error scenario tests

use radiosync_config::{Config, ConfigError, ConfigManager};
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[sync\ninterval_minutes = ")?;

    assert!(matches!(manager.load(), Err(ConfigError::Parse { .. })));
    assert_eq!(manager.load_or_default(), Config::default());
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("a").join("b").join("radiosync");
    let manager = ConfigManager::with_directory(nested)?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());
    Ok(())
}

#[test]
fn test_concurrent_config_loads() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    ConfigManager::with_directory(config_dir.clone())?.initialize()?;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                let manager = ConfigManager::with_directory(dir).expect("manager");
                for _ in 0..10 {
                    assert!(manager.load().is_ok());
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }
    Ok(())
}

#[test]
fn test_boundary_values_validation() {
    let mut config = Config::default();

    config.sync.interval_minutes = 1;
    config.sync.cache_size = 1;
    assert!(config.validate().is_ok());

    config.sync.interval_minutes = 1440;
    config.sync.cache_size = 10_000;
    assert!(config.validate().is_ok());

    config.sync.interval_minutes = 1441;
    assert!(config.validate().is_err());
}

#[test]
fn test_all_validation_errors_collected() {
    let mut config = Config::default();
    config.radio.feed_url = "nrk".to_string();
    config.spotify.api_url = String::new();
    config.sync.cache_size = 0;
    config.sync.cycle_budget_secs = 0;

    assert_eq!(config.validate().unwrap_err().len(), 4);
}

#[test]
fn test_unknown_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        "[sync]\nadaptive = true\nfuture_option = 3\n\n[display]\ncolor = true\n",
    )?;

    let config = manager.load()?;
    assert!(config.sync.adaptive);
    Ok(())
}

#[test]
fn test_wrong_type_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[sync]\ncache_size = \"big\"\n")?;

    assert!(matches!(manager.load(), Err(ConfigError::Parse { .. })));
    Ok(())
}

#[test]
fn test_update_with_invalid_value() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;

    let result = manager.update(|config| config.sync.interval_minutes = 0);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));

    assert_eq!(manager.load()?.sync.interval_minutes, 5);
    Ok(())
}

#[test]
fn test_backup_preserved_on_failed_save() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut config = Config::default();
    config.sync.cache_size = 75;
    manager.save(&config)?;
    manager.save(&config)?;

    config.sync.cache_size = 0;
    assert!(manager.save(&config).is_err());

    let backup_path = manager.config_path().with_extension("toml.backup");
    let backup_config: Config = toml::from_str(&fs::read_to_string(backup_path)?)?;
    assert_eq!(backup_config.sync.cache_size, 75);
    Ok(())
}
