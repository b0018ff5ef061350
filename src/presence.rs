//! Occupancy tracking from network liveness probes.
//!
//! Each configured presence source (a phone, usually) is pinged on its own
//! thread; positive results flow back to the engine loop, which records the
//! sighting here. Somebody is home while at least one source was seen within
//! the away interval. Transitions are edge-triggered: `check_transition`
//! reports each flip exactly once, and reports nothing on its first call
//! or during the warm-up window after startup, when no sighting has had a
//! chance to arrive yet.

use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local};

/// An occupancy flip detected by `check_transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    Arrived,
    Departed,
}

/// Liveness probe for one presence source.
#[cfg_attr(test, mockall::automock)]
pub trait PresenceScanner: Send + Sync {
    /// Whether the source responded. Blocking; called off the loop thread.
    /// A scan error is non-fatal and treated as "not seen" by the caller.
    fn scan(&self, source: &str) -> anyhow::Result<bool>;
}

/// ICMP probe via the system `ping` binary.
pub struct PingScanner {
    timeout: Duration,
}

impl PingScanner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl PresenceScanner for PingScanner {
    fn scan(&self, source: &str) -> anyhow::Result<bool> {
        let status = Command::new("ping")
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(self.timeout.as_secs().max(1).to_string())
            .arg(source)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to launch ping for {source}"))?;
        Ok(status.success())
    }
}

/// Last-seen bookkeeping and home/away edge detection.
pub struct PresenceTracker {
    sources: Vec<String>,
    last_seen: HashMap<String, DateTime<Local>>,
    away_interval: chrono::Duration,
    warmup: chrono::Duration,
    constructed_at: DateTime<Local>,
    /// Occupancy at the last `check_transition`; None before the first call.
    last_known: Option<bool>,
}

impl PresenceTracker {
    pub fn new(
        sources: Vec<String>,
        away_interval: Duration,
        warmup: Duration,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            sources,
            last_seen: HashMap::new(),
            away_interval: chrono::Duration::from_std(away_interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(360)),
            warmup: chrono::Duration::from_std(warmup)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            constructed_at: now,
            last_known: None,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Record a positive probe. Unknown sources are ignored.
    pub fn record_alive(&mut self, source: &str, now: DateTime<Local>) {
        if self.sources.iter().any(|s| s == source) {
            self.last_seen.insert(source.to_string(), now);
        }
    }

    /// True while any source was seen within the away interval.
    ///
    /// A sighting exactly `away_interval` ago still counts as home; the flip
    /// happens one tick later. With no sources configured, the tracker
    /// reports home forever and never transitions.
    pub fn is_home(&self, now: DateTime<Local>) -> bool {
        if self.sources.is_empty() {
            return true;
        }
        let cutoff = now - self.away_interval;
        self.last_seen.values().any(|&seen| seen >= cutoff)
    }

    /// Sources worth re-probing: skip ones seen within half the away
    /// interval, their sighting cannot lapse before the next rescan.
    pub fn stale_sources(&self, now: DateTime<Local>) -> Vec<String> {
        let cutoff = now - self.away_interval / 2;
        self.sources
            .iter()
            .filter(|source| {
                self.last_seen
                    .get(*source)
                    .is_none_or(|&seen| seen < cutoff)
            })
            .cloned()
            .collect()
    }

    /// Compare current occupancy to the last observation and report a flip.
    ///
    /// The first call establishes the baseline without reporting. During the
    /// warm-up window after construction the baseline keeps tracking but
    /// flips are swallowed, a fresh start must not read as a departure.
    pub fn check_transition(&mut self, now: DateTime<Local>) -> Option<PresenceTransition> {
        let home = self.is_home(now);
        let previous = self.last_known.replace(home);
        let warming_up = now - self.constructed_at < self.warmup;
        match previous {
            Some(was_home) if was_home != home && !warming_up => {
                if home {
                    Some(PresenceTransition::Arrived)
                } else {
                    Some(PresenceTransition::Departed)
                }
            }
            _ => None,
        }
    }
}
