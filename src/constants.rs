//! Default values and validation ranges used across the configuration system.

use crate::hhmm::HhMm;

/// Fallback sun times used until the first successful sun lookup.
pub const DEFAULT_SUNRISE: HhMm = HhMm::from_minutes(6 * 60);
pub const DEFAULT_SUNSET: HhMm = HhMm::from_minutes(18 * 60);

/// Transition duration handed to the gateway with every command, in seconds.
pub const DEFAULT_TRANSITION_SECONDS: u64 = 3;

/// Rotation interval bounds for the away-mode primary group, in minutes.
pub const DEFAULT_FASTEST_CHANGE_MINUTES: u32 = 15;
pub const DEFAULT_SLOWEST_CHANGE_MINUTES: u32 = 45;

/// Power level restored to all primary groups when the family returns.
pub const DEFAULT_WELCOME_POWER: u8 = 90;

/// Seconds without a sighting before a presence source counts as away.
pub const DEFAULT_AWAY_SECONDS: u64 = 360;

/// Seconds between presence rescan passes.
pub const DEFAULT_RESCAN_SECONDS: u64 = 30;

/// Seconds after startup during which presence transitions are suppressed.
pub const DEFAULT_WARMUP_SECONDS: u64 = 60;

/// Timeout handed to the ping scanner per probe, in seconds.
pub const DEFAULT_SCAN_TIMEOUT_SECONDS: u64 = 5;

/// Seconds between rule evaluation passes.
pub const DEFAULT_RULE_POLL_SECONDS: u64 = 30;

/// Seconds between manual-override directory polls.
pub const DEFAULT_OVERRIDE_POLL_SECONDS: u64 = 5;

/// Seconds between gateway keep-alive checks.
pub const DEFAULT_KEEPALIVE_SECONDS: u64 = 60;

/// Directory polled for one-shot manual override files.
pub const DEFAULT_OVERRIDE_DIR: &str = "control";

// Validation ranges
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MAX_POWER: u8 = 100;

/// Minute-valued settings must stay below one day so the wall-clock
/// arithmetic on `HhMm` cannot wrap more than once.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Exit code used for unrecoverable startup failures.
pub const EXIT_FAILURE: i32 = 1;
