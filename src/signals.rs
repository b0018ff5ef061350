//! Signal handling for the engine loop.
//!
//! A dedicated thread turns process signals into engine events: the
//! termination signals flip the shared running flag and queue a shutdown,
//! SIGUSR2 queues a configuration reload.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::Sender,
    thread,
};

use crate::engine::EngineEvent;

/// Spawn the signal handling thread.
///
/// Returns the shared running flag the engine loop checks each iteration.
pub fn setup_signal_handler(event_sender: Sender<EngineEvent>) -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP, SIGUSR2])
        .context("Failed to register signal handlers")?;

    thread::spawn(move || {
        for signal in signals.forever() {
            match signal {
                SIGUSR2 => {
                    if event_sender.send(EngineEvent::Reload).is_err() {
                        break;
                    }
                }
                SIGTERM | SIGINT | SIGHUP => {
                    running_clone.store(false, Ordering::SeqCst);
                    let _ = event_sender.send(EngineEvent::Shutdown);
                    break;
                }
                _ => {}
            }
        }
    });

    Ok(running)
}
