//! File watching for hot config reloading.
//!
//! Monitors luxr.toml and sends a reload event to the engine loop when it
//! changes, so edits apply without restarting or signalling the daemon.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::engine::EngineEvent;

/// Debounce duration for file change events.
/// Prevents multiple reloads when editors write files in multiple steps.
const DEBOUNCE_MS: u64 = 500;

/// Start the configuration file watcher.
///
/// Watches the config directory non-recursively, which catches the
/// rename-over saves editors do, and filters events down to luxr.toml.
pub fn start_config_watcher(event_sender: Sender<EngineEvent>) -> Result<()> {
    let config_path = super::get_config_path()?;
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return Ok(());
    };
    if !config_dir.exists() {
        log_debug!("Config directory missing, hot reload disabled");
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                        let _ = tx.send(event);
                    }
                    _ => {}
                }
            }
        },
        NotifyConfig::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(&config_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", config_dir.display()))?;

    let file_name = config_path.file_name().map(|n| n.to_os_string());
    thread::spawn(move || {
        // Keep the watcher alive by moving it into the thread.
        let _watcher = watcher;
        let mut last_reload = std::time::Instant::now() - Duration::from_millis(DEBOUNCE_MS);

        for event in rx {
            let affects_config = event
                .paths
                .iter()
                .any(|path| path.file_name().map(|n| n.to_os_string()) == file_name);
            if !affects_config {
                continue;
            }

            if last_reload.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
                continue;
            }

            if event_sender.send(EngineEvent::Reload).is_err() {
                // Engine gone, exit thread.
                break;
            }
            last_reload = std::time::Instant::now();
        }
    });

    Ok(())
}
