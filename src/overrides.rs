//! Manual override drop-box.
//!
//! Anything on the host can force a group's power by touching a file named
//! `<group>-p<power>` in the control directory, e.g. `Living room-p75`.
//! The engine polls the directory every few seconds, consumes each file and
//! applies the decision, presence state notwithstanding. Malformed names are
//! consumed too so they do not warn on every poll.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::constants::MAX_POWER;
use crate::rules::Decision;

/// Read and delete pending override files.
///
/// A missing directory is not an error, it simply means no overrides.
pub fn poll(dir: &Path) -> Result<Vec<(String, Decision)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut decisions = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        match parse(name) {
            Some((group, power)) => {
                decisions.push((group.to_string(), Decision::power(power)));
            }
            None => log_warning!("Ignoring malformed override file: {name}"),
        }
        fs::remove_file(entry.path())?;
    }
    Ok(decisions)
}

/// Split `<group>-p<power>` on its final `-p` marker.
fn parse(name: &str) -> Option<(&str, u8)> {
    let (group, power) = name.rsplit_once("-p")?;
    let power: u8 = power.parse().ok()?;
    if group.is_empty() || power > MAX_POWER {
        return None;
    }
    Some((group, power))
}
