//! The decision engine: one loop thread owning all mutable state.
//!
//! The engine blocks on its event channel with a timeout computed from the
//! next due tick, so it sleeps until either an event arrives or a tick
//! deadline passes. Four periodic ticks drive it:
//!
//! - a fast tick polling the manual override drop-box,
//! - a rule tick evaluating the scheduled table and the away rotation,
//! - a presence rescan tick that spawns probe threads for stale sources,
//! - a gateway keep-alive tick.
//!
//! Scanner threads and the signal thread only ever send events; every piece
//! of mutable state lives on the loop thread. Each tick runs to completion
//! before the next is considered. Actuation failures are logged per group
//! and never stop the remaining groups from being evaluated.
//!
//! Occupancy is a two-state machine with Home as the initial state. The
//! scheduled rule table is evaluated in both states; time-of-day rules are
//! independent of presence. The flip to Away additionally selects a primary
//! group to keep dimly lit and switches everything else off, and while Away
//! the selection rotates at a randomized interval, emitted ahead of the
//! scheduled decisions within a tick. Flipping back to Home lights the
//! primary groups at the welcome power. Transitions are detected once per
//! scan-result ingestion or rescan tick, never per group, so a flip can not
//! emit duplicate command sets.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::gateway::{Group, LightGateway};
use crate::hhmm::HhMm;
use crate::overrides;
use crate::presence::{PresenceScanner, PresenceTracker, PresenceTransition};
use crate::rotation::RotationScheduler;
use crate::rules::{self, Decision, Schedule};
use crate::sun::{SolarLookup, StaticLookup, SunLookup, SunTimes};
use crate::time_source;

/// Everything that can wake the engine loop.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A presence probe finished.
    ScanResult { source: String, alive: bool },
    /// Reload configuration (SIGUSR2 or config watcher).
    Reload,
    /// Shut down (termination signals).
    Shutdown,
}

pub struct Engine {
    config: Config,
    schedule: Schedule,
    transition: Duration,
    override_dir: PathBuf,
    gateway: Box<dyn LightGateway>,
    groups: Vec<Group>,
    scanner: Arc<dyn PresenceScanner>,
    presence: PresenceTracker,
    rotation: RotationScheduler,
    sun: SunTimes,
    rng: StdRng,
    away: bool,
    /// Last minute the rule table was evaluated for, so a poll cadence
    /// faster than a minute cannot fire the same trigger twice.
    last_rule_minute: Option<HhMm>,
    receiver: Receiver<EngineEvent>,
    sender: Sender<EngineEvent>,
}

impl Engine {
    pub fn new(
        config: Config,
        gateway: Box<dyn LightGateway>,
        scanner: Arc<dyn PresenceScanner>,
        receiver: Receiver<EngineEvent>,
        sender: Sender<EngineEvent>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let schedule = config.schedule();
        let transition = config.transition();
        let override_dir = config.override_dir()?;
        let presence = PresenceTracker::new(
            config.presence.sources.clone(),
            Duration::from_secs(config.presence.away_seconds),
            Duration::from_secs(config.presence.warmup_seconds),
            now,
        );
        let rotation = RotationScheduler::new(
            now,
            config.away.fastest_change_minutes,
            config.away.slowest_change_minutes,
        );
        let sun = SunTimes::new(
            sun_lookup(&config)?,
            config.sunrise_offset(),
            config.sunset_offset(),
        );
        let rng = match config.engine.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            schedule,
            transition,
            override_dir,
            gateway,
            groups: Vec::new(),
            scanner,
            presence,
            rotation,
            sun,
            rng,
            away: false,
            last_rule_minute: None,
            receiver,
            sender,
        })
    }

    pub fn is_away(&self) -> bool {
        self.away
    }

    /// Connect the gateway and run the loop until shutdown.
    pub fn run(&mut self, running: Arc<AtomicBool>) -> Result<()> {
        self.connect()?;
        self.spawn_scans(time_source::now());

        let override_period = Duration::from_secs(self.config.engine.override_poll_seconds);
        let rule_period = Duration::from_secs(self.config.engine.rule_poll_seconds);
        let rescan_period = Duration::from_secs(self.config.presence.rescan_seconds);
        let keepalive_period = Duration::from_secs(self.config.engine.keepalive_seconds);

        // First rule tick fires immediately so startup state is not blank
        // for a full poll interval.
        let start = Instant::now();
        let mut next_override = start + override_period;
        let mut next_rule = start;
        let mut next_rescan = start + rescan_period;
        let mut next_keepalive = start + keepalive_period;

        while running.load(Ordering::SeqCst) {
            let deadline = next_override
                .min(next_rule)
                .min(next_rescan)
                .min(next_keepalive);
            let timeout = deadline.saturating_duration_since(Instant::now());

            match self.receiver.recv_timeout(timeout) {
                Ok(EngineEvent::Shutdown) => break,
                Ok(event) => self.handle_event(event)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Deadlines reset from the current instant, a delayed tick must
            // not trigger a catch-up burst.
            if Instant::now() >= next_override {
                self.override_tick(time_source::now())?;
                next_override = Instant::now() + override_period;
            }
            if Instant::now() >= next_rule {
                self.rule_tick(time_source::now())?;
                next_rule = Instant::now() + rule_period;
            }
            if Instant::now() >= next_rescan {
                self.rescan_tick(time_source::now())?;
                next_rescan = Instant::now() + rescan_period;
            }
            if Instant::now() >= next_keepalive {
                self.keepalive_tick();
                next_keepalive = Instant::now() + keepalive_period;
            }
        }

        log_block_start!("Shutting down");
        Ok(())
    }

    /// Establish the gateway session and fetch the group list.
    pub fn connect(&mut self) -> Result<()> {
        self.gateway
            .connect()
            .context("Failed to connect to gateway")?;
        self.groups = self
            .gateway
            .groups()
            .context("Failed to fetch groups from gateway")?;
        log_block_start!(
            "Connected to {} gateway, {} groups",
            self.gateway.gateway_name(),
            self.groups.len()
        );
        for group in &self.groups {
            log_indented!("{} (id {})", group.name, group.id);
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::ScanResult { source, alive } => {
                self.handle_scan_result(&source, alive, time_source::now())
            }
            EngineEvent::Reload => {
                self.reload(time_source::now());
                Ok(())
            }
            EngineEvent::Shutdown => Ok(()),
        }
    }

    /// Ingest one probe result and re-evaluate occupancy.
    pub fn handle_scan_result(
        &mut self,
        source: &str,
        alive: bool,
        now: DateTime<Local>,
    ) -> Result<()> {
        if alive {
            self.presence.record_alive(source, now);
        }
        self.evaluate_presence(now)
    }

    /// Evaluate the scheduled rule table and the away rotation.
    pub fn rule_tick(&mut self, now: DateTime<Local>) -> Result<()> {
        let (sun, refreshed) = self.sun.times(now);
        if refreshed {
            log_block_start!("Sun times: sunrise {}, sunset {}", sun.sunrise, sun.sunset);
        }

        if self.away && self.rotation.should_rotate(now) {
            self.emit_away_set(now)?;
        }

        let minute = HhMm::from(now);
        if self.last_rule_minute == Some(minute) {
            return Ok(());
        }
        self.last_rule_minute = Some(minute);

        let groups: Vec<String> = self.groups.iter().map(|g| g.name.clone()).collect();
        for name in groups {
            if let Some(decision) = self.schedule.evaluate(&name, minute, &sun) {
                if decision.is_noop() {
                    continue;
                }
                log_block_start!("Rule fired for {name} at {minute}");
                self.apply_by_name(&name, &decision)?;
            }
        }
        Ok(())
    }

    /// Consume pending override files and apply them.
    pub fn override_tick(&mut self, _now: DateTime<Local>) -> Result<()> {
        let pending = match overrides::poll(&self.override_dir) {
            Ok(pending) => pending,
            Err(e) => {
                log_warning!("Override poll failed: {e}");
                return Ok(());
            }
        };
        for (name, decision) in pending {
            log_block_start!("Manual override for {name}");
            self.apply_by_name(&name, &decision)?;
        }
        Ok(())
    }

    /// Spawn probes for stale sources and re-check occupancy, absence of
    /// results is the only way a departure becomes visible.
    pub fn rescan_tick(&mut self, now: DateTime<Local>) -> Result<()> {
        self.spawn_scans(now);
        self.evaluate_presence(now)
    }

    fn keepalive_tick(&mut self) {
        if let Err(e) = self.gateway.ping() {
            log_warning!("Gateway keep-alive failed: {e}");
        }
    }

    fn spawn_scans(&self, now: DateTime<Local>) {
        for source in self.presence.stale_sources(now) {
            let scanner = Arc::clone(&self.scanner);
            let sender = self.sender.clone();
            thread::spawn(move || {
                let alive = match scanner.scan(&source) {
                    Ok(alive) => alive,
                    Err(e) => {
                        log_warning!("Presence scan failed for {source}: {e}");
                        false
                    }
                };
                let _ = sender.send(EngineEvent::ScanResult { source, alive });
            });
        }
    }

    /// Check for an occupancy flip and emit the matching one-time set.
    pub fn evaluate_presence(&mut self, now: DateTime<Local>) -> Result<()> {
        match self.presence.check_transition(now) {
            Some(PresenceTransition::Departed) => self.enter_away(now),
            Some(PresenceTransition::Arrived) => self.enter_home(now),
            None => Ok(()),
        }
    }

    fn enter_away(&mut self, now: DateTime<Local>) -> Result<()> {
        log_block_start!("Nobody home, entering away mode");
        self.away = true;
        self.emit_away_set(now)
    }

    fn enter_home(&mut self, now: DateTime<Local>) -> Result<()> {
        log_block_start!("Somebody arrived, leaving away mode");
        self.away = false;
        self.rotation.clear(now);
        let welcome = Decision::power(self.config.away.welcome_power);
        let primaries = self.config.away.primary_groups.clone();
        for name in primaries {
            self.apply_by_name(&name, &welcome)?;
        }
        Ok(())
    }

    /// Rotate the lit primary and emit the full away command set: the
    /// selection dimmed to a random 30-60, everything else off.
    fn emit_away_set(&mut self, now: DateTime<Local>) -> Result<()> {
        let primaries = self.config.away.primary_groups.clone();
        let selected = self
            .rotation
            .rotate(&primaries, now, &mut self.rng)
            .map(str::to_string);
        let dim = rules::away_power(&mut self.rng);

        match &selected {
            Some(name) => log_block_start!("Away rotation: {name} lit at {dim}%"),
            None => log_block_start!("Away mode: no primary groups configured"),
        }

        let secondaries = self.config.away.secondary_groups.clone();
        for name in primaries.iter().chain(&secondaries) {
            let decision = if Some(name) == selected.as_ref() {
                Decision::power(dim)
            } else {
                Decision::power(0)
            };
            self.apply_by_name(name, &decision)?;
        }
        Ok(())
    }

    fn apply_by_name(&mut self, name: &str, decision: &Decision) -> Result<()> {
        let Some(group) = self.groups.iter().find(|g| g.name == name) else {
            log_warning!("No gateway group named '{name}', skipping");
            return Ok(());
        };
        match self.gateway.apply(group, decision, self.transition) {
            Ok(report) => {
                if !report.all_ok() {
                    log_warning!("Partial failure applying to {name}: {report:?}");
                }
            }
            Err(e) => log_warning!("Failed to apply to {name}: {e}"),
        }
        Ok(())
    }

    /// Swap in a freshly loaded configuration; a load failure keeps the
    /// current one running.
    pub fn reload(&mut self, now: DateTime<Local>) {
        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_pipe!();
                log_warning!("Reload failed, keeping current configuration: {e}");
                return;
            }
        };
        log_block_start!("Configuration reloaded");

        if config.presence.sources != self.config.presence.sources
            || config.presence.away_seconds != self.config.presence.away_seconds
        {
            self.presence = PresenceTracker::new(
                config.presence.sources.clone(),
                Duration::from_secs(config.presence.away_seconds),
                Duration::from_secs(config.presence.warmup_seconds),
                now,
            );
        }
        self.rotation = RotationScheduler::new(
            now,
            config.away.fastest_change_minutes,
            config.away.slowest_change_minutes,
        );
        match sun_lookup(&config) {
            Ok(lookup) => {
                self.sun = SunTimes::new(lookup, config.sunrise_offset(), config.sunset_offset());
            }
            Err(e) => log_warning!("Keeping previous sun lookup: {e}"),
        }
        self.schedule = config.schedule();
        self.transition = config.transition();
        match config.override_dir() {
            Ok(dir) => self.override_dir = dir,
            Err(e) => log_warning!("Keeping previous override directory: {e}"),
        }
        if let Some(seed) = config.engine.rng_seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        match self.gateway.groups() {
            Ok(groups) => self.groups = groups,
            Err(e) => log_warning!("Keeping previous group list: {e}"),
        }
        self.config = config;
        self.config.log_config();
    }
}

fn sun_lookup(config: &Config) -> Result<Box<dyn SunLookup>> {
    match (config.latitude, config.longitude) {
        (Some(lat), Some(lon)) => Ok(Box::new(SolarLookup::new(lat, lon)?)),
        _ => Ok(Box::new(StaticLookup)),
    }
}
