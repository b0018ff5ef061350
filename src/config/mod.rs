//! Configuration system for luxr with validation and hot reload.
//!
//! Configuration lives in `luxr.toml`, searched for in
//! **XDG_CONFIG_HOME**/luxr/luxr.toml (or the directory given with
//! `--config`). A default file is generated on first run.
//!
//! ## Configuration Structure
//!
//! ```toml
//! gateway = "dryrun"        # Gateway to drive: "dryrun"
//! transition_seconds = 3    # Light fade duration passed to the gateway
//!
//! #[Location, for sun-relative rules]
//! latitude = 59.3293
//! longitude = 18.0686
//! sunrise_offset_minutes = 0
//! sunset_offset_minutes = 0
//!
//! [presence]
//! sources = ["192.168.1.20"]  # Hosts whose liveness means somebody is home
//! away_seconds = 360          # No sighting for this long means away
//! rescan_seconds = 30
//! warmup_seconds = 60
//!
//! [away]
//! primary_groups = ["Living room", "Bed room"] # Rotation candidates
//! fastest_change_minutes = 15
//! slowest_change_minutes = 45
//! welcome_power = 90          # Power for the primary groups on arrival
//!
//! [engine]
//! rule_poll_seconds = 30
//! override_poll_seconds = 5
//! override_dir = "control"    # Relative to the config directory
//!
//! [[rule]]                    # Omit all rules to use the built-in table
//! group = "Outdoor"
//! sun = "sunset"
//! power = 95
//! ```
//!
//! ## Validation
//!
//! Loading validates coordinate ranges, rotation interval ordering, power
//! percentages and rule triggers, and rejects impossible configurations with
//! messages naming the offending field.

pub mod loading;
pub mod validation;
pub mod watcher;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;
use crate::hhmm::HhMm;
use crate::rules::{ColorTemp, Decision, Rule, Schedule, SunEvent, Trigger};

// Re-export public API
pub use loading::{get_config_dir, get_config_path, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Gateway selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Log every command instead of sending it.
    #[default]
    DryRun,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::DryRun => "dryrun",
        }
    }
}

/// Presence detection settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PresenceConfig {
    /// Hosts probed for liveness. Empty means presence is never evaluated.
    pub sources: Vec<String>,
    pub away_seconds: u64,
    pub rescan_seconds: u64,
    pub warmup_seconds: u64,
    pub scan_timeout_seconds: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            away_seconds: DEFAULT_AWAY_SECONDS,
            rescan_seconds: DEFAULT_RESCAN_SECONDS,
            warmup_seconds: DEFAULT_WARMUP_SECONDS,
            scan_timeout_seconds: DEFAULT_SCAN_TIMEOUT_SECONDS,
        }
    }
}

/// Away-mode rotation settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AwayConfig {
    /// Groups eligible for the lit-while-away rotation.
    pub primary_groups: Vec<String>,
    /// Groups switched off outright when the house empties.
    pub secondary_groups: Vec<String>,
    pub fastest_change_minutes: u32,
    pub slowest_change_minutes: u32,
    /// Power applied to the primary groups when somebody arrives.
    pub welcome_power: u8,
}

impl Default for AwayConfig {
    fn default() -> Self {
        Self {
            primary_groups: Vec::new(),
            secondary_groups: Vec::new(),
            fastest_change_minutes: DEFAULT_FASTEST_CHANGE_MINUTES,
            slowest_change_minutes: DEFAULT_SLOWEST_CHANGE_MINUTES,
            welcome_power: DEFAULT_WELCOME_POWER,
        }
    }
}

/// Engine poll cadences and the override drop-box location.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub rule_poll_seconds: u64,
    pub override_poll_seconds: u64,
    pub keepalive_seconds: u64,
    /// Override directory, resolved relative to the config directory.
    pub override_dir: String,
    /// Fixed RNG seed; unset means seeded from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_poll_seconds: DEFAULT_RULE_POLL_SECONDS,
            override_poll_seconds: DEFAULT_OVERRIDE_POLL_SECONDS,
            keepalive_seconds: DEFAULT_KEEPALIVE_SECONDS,
            override_dir: DEFAULT_OVERRIDE_DIR.to_string(),
            rng_seed: None,
        }
    }
}

/// One `[[rule]]` table entry, converted to a `Rule` after validation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuleConfig {
    pub group: String,
    /// Fixed trigger minute, "HH:MM". Mutually exclusive with `sun`.
    pub at: Option<HhMm>,
    /// Sun-event trigger. Mutually exclusive with `at`.
    pub sun: Option<SunEvent>,
    /// Minute offset applied to the sun event.
    #[serde(default)]
    pub offset_minutes: i32,
    pub power: Option<u8>,
    /// Warmth percent, one of 0, 63 or 100.
    pub color_temp: Option<u8>,
    pub color: Option<String>,
}

impl RuleConfig {
    /// Convert to a rule. Only called on validated entries.
    fn to_rule(&self) -> Rule {
        let trigger = match (self.at, self.sun) {
            (Some(time), _) => Trigger::At(time),
            (None, Some(event)) => Trigger::Sun {
                event,
                offset_minutes: self.offset_minutes,
            },
            (None, None) => unreachable!("validation rejects rules without a trigger"),
        };
        Rule {
            group: self.group.clone(),
            trigger,
            decision: Decision {
                power: self.power,
                color_temp: self.color_temp.map(|v| {
                    ColorTemp::try_from(v).unwrap_or_else(|_| {
                        unreachable!("validation rejects invalid color_temp values")
                    })
                }),
                color: self.color.clone(),
            },
        }
    }
}

/// Top-level configuration, loaded from `luxr.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayKind,
    /// Fade duration handed to the gateway with every command.
    pub transition_seconds: Option<u64>,
    /// Geographic latitude for sun time calculation.
    pub latitude: Option<f64>,
    /// Geographic longitude for sun time calculation.
    pub longitude: Option<f64>,
    /// Minutes added to the computed sunrise before rules see it.
    pub sunrise_offset_minutes: Option<i32>,
    /// Minutes added to the computed sunset before rules see it.
    pub sunset_offset_minutes: Option<i32>,
    pub presence: PresenceConfig,
    pub away: AwayConfig,
    pub engine: EngineConfig,
    #[serde(rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    pub fn transition(&self) -> Duration {
        Duration::from_secs(self.transition_seconds.unwrap_or(DEFAULT_TRANSITION_SECONDS))
    }

    pub fn sunrise_offset(&self) -> i32 {
        self.sunrise_offset_minutes.unwrap_or(0)
    }

    pub fn sunset_offset(&self) -> i32 {
        self.sunset_offset_minutes.unwrap_or(0)
    }

    /// The effective rule table: configured rules, or the built-in table
    /// when the configuration declares none.
    pub fn schedule(&self) -> Schedule {
        if self.rules.is_empty() {
            Schedule::builtin()
        } else {
            Schedule::new(self.rules.iter().map(RuleConfig::to_rule).collect())
        }
    }

    /// Absolute override directory, relative paths anchored at the config
    /// directory.
    pub fn override_dir(&self) -> anyhow::Result<PathBuf> {
        let dir = PathBuf::from(&self.engine.override_dir);
        if dir.is_absolute() {
            Ok(dir)
        } else {
            Ok(loading::get_config_dir()?.join(dir))
        }
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Gateway: {}", self.gateway.as_str());

        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            let lat_dir = if lat >= 0.0 { "N" } else { "S" };
            let lon_dir = if lon >= 0.0 { "E" } else { "W" };
            log_indented!(
                "Location: {:.3}°{}, {:.3}°{}",
                lat.abs(),
                lat_dir,
                lon.abs(),
                lon_dir
            );
        } else {
            log_indented!(
                "Location: not set, sun rules use {}/{}",
                DEFAULT_SUNRISE,
                DEFAULT_SUNSET
            );
        }

        let schedule = self.schedule();
        if self.rules.is_empty() {
            log_indented!("Rules: built-in table ({} rules)", schedule.len());
        } else {
            log_indented!("Rules: {} configured", schedule.len());
        }

        if self.presence.sources.is_empty() {
            log_indented!("Presence: disabled, always home");
        } else {
            log_indented!(
                "Presence: {} sources, away after {}s",
                self.presence.sources.len(),
                self.presence.away_seconds
            );
            log_indented!(
                "Away rotation: {} groups, every {}-{} minutes",
                self.away.primary_groups.len(),
                self.away.fastest_change_minutes,
                self.away.slowest_change_minutes
            );
        }
    }
}
