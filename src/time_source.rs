//! Time source abstraction for the daemon's single timeline.
//!
//! All wall-clock reads in the main loop go through the global time source
//! so tests can substitute a fixed clock. Component logic (presence,
//! rotation, rules, sun cache) takes `now` as an explicit argument instead;
//! only the loop and coordinator read the global.

use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Global time source instance, defaults to `RealTimeSource`.
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting wall-clock reads.
pub trait TimeSource: Send + Sync {
    /// Get the current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Real-time implementation that uses actual system time.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fixed clock for tests: always reports the instant it was built with.
pub struct FixedTimeSource {
    instant: DateTime<Local>,
}

impl FixedTimeSource {
    pub fn new(instant: DateTime<Local>) -> Self {
        Self { instant }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.instant
    }
}

/// Initialize the global time source (call once at startup).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Get the current time from the global time source.
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}
