//! Configuration loading.
//!
//! Handles path discovery, first-run default file generation and parsing.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Default configuration written on first run.
const DEFAULT_CONFIG: &str = r#"# Luxr configuration
gateway = "dryrun"       # Gateway to drive: "dryrun"
transition_seconds = 3   # Light fade duration in seconds

# Location for sun-relative rules. Without coordinates sun rules fall
# back to 06:00 / 18:00.
#latitude = 59.3293
#longitude = 18.0686
#sunrise_offset_minutes = 0
#sunset_offset_minutes = 0

[presence]
# Hosts whose network liveness means somebody is home. Leave empty to
# disable presence detection entirely.
sources = []
away_seconds = 360       # No sighting for this long means away
rescan_seconds = 30
warmup_seconds = 60

[away]
# Groups rotated while the house is empty, one lit at a time.
primary_groups = []
# Groups switched off outright when the house empties.
secondary_groups = []
fastest_change_minutes = 15
slowest_change_minutes = 45
welcome_power = 90       # Power for the primary groups on arrival

[engine]
rule_poll_seconds = 30
override_poll_seconds = 5
override_dir = "control" # Relative paths resolve against this directory

# Scheduled rules. With no [[rule]] entries a built-in table is used.
#[[rule]]
#group = "Outdoor"
#sun = "sunset"
#power = 95
"#;

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// The directory holding luxr.toml and the default override drop-box.
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(custom_dir) = CONFIG_DIR.get().and_then(|d| d.clone()) {
        return Ok(custom_dir);
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("luxr"))
}

/// Full path of the configuration file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("luxr.toml"))
}

/// Load configuration using automatic path detection.
///
/// Creates a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Load configuration from a specific path. Does not create defaults.
pub fn load_from_path(path: &PathBuf) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    validate_config(&config)?;

    Ok(config)
}

/// Write the commented default configuration file.
pub fn create_default_config(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;
    log_block_start!("Created default configuration: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_parses_and_validates() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        validate_config(&config).unwrap();
    }

    #[test]
    fn load_from_path_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("luxr.toml");
        fs::write(&path, "gateway = ").unwrap();
        assert!(load_from_path(&path).is_err());
    }

    #[test]
    fn create_default_writes_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("luxr.toml");
        create_default_config(&path).unwrap();
        let config = load_from_path(&path).unwrap();
        assert!(config.presence.sources.is_empty());
    }
}
