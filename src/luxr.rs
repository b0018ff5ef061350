//! Application coordinator that manages the complete lifecycle of luxr.
//!
//! Handles resource acquisition, initialization and orchestration of the
//! engine: configuration loading, lock file management for single-instance
//! enforcement, signal handler setup, the config watcher, gateway creation
//! and finally the engine loop itself.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::{
    config::{self, Config},
    engine::Engine,
    gateway::create_gateway,
    lock::acquire_lock,
    presence::PingScanner,
    signals::setup_signal_handler,
    time_source,
};

/// Builder for configuring and running the luxr engine.
///
/// # Examples
///
/// ```no_run
/// use luxr::Luxr;
///
/// # fn main() -> anyhow::Result<()> {
/// let debug_enabled = false;
/// Luxr::new(debug_enabled).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Luxr {
    debug_enabled: bool,
    create_lock: bool,
}

impl Luxr {
    /// Create a new runner with defaults matching a normal run.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
        }
    }

    /// Skip lock file creation (for supervised environments with their own
    /// instance management).
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Execute the engine with the configured settings.
    ///
    /// Acquires the lock, loads configuration, wires up signals and the
    /// config watcher, then blocks in the engine loop until shutdown.
    pub fn run(self) -> Result<()> {
        log_version!();
        crate::logger::Log::set_debug(self.debug_enabled);

        time_source::init_time_source(Arc::new(time_source::RealTimeSource));

        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(crate::constants::EXIT_FAILURE);
            }
        };

        let _lock = if self.create_lock {
            match acquire_lock()? {
                Some(lock) => Some(lock),
                None => {
                    log_end!();
                    return Ok(());
                }
            }
        } else {
            None
        };

        let (sender, receiver) = mpsc::channel();

        let running = setup_signal_handler(sender.clone())?;

        // Hot reload is best effort; SIGUSR2 still works without it.
        if let Err(e) = config::start_config_watcher(sender.clone())
            && self.debug_enabled
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {e}");
            log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
        }

        config.log_config();

        let gateway = create_gateway(&config)?;
        let scanner = Arc::new(PingScanner::new(Duration::from_secs(
            config.presence.scan_timeout_seconds,
        )));

        log_block_start!("Lock acquired, starting luxr...");

        let mut engine = Engine::new(
            config,
            gateway,
            scanner,
            receiver,
            sender,
            time_source::now(),
        )
        .context("Failed to initialize engine")?;
        let result = engine.run(running);

        log_end!();
        result
    }
}
