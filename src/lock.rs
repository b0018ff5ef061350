//! Lock file management for single-instance enforcement.

use anyhow::Result;
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

/// Acquire an exclusive lock on the lock file.
///
/// Creates and locks a file in the runtime directory so only one engine runs
/// at a time. The lock file holds the owning PID.
///
/// # Returns
/// - `Ok(Some((lock_file, lock_path)))` if the lock was acquired
/// - `Ok(None)` if another instance already holds it
pub fn acquire_lock() -> Result<Option<(File, String)>> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    let lock_path = format!("{runtime_dir}/luxr.lock");

    // Open without truncating so a holder's PID stays readable on conflict.
    let mut lock_file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;

    match lock_file.try_lock_exclusive() {
        Ok(()) => {
            lock_file.set_len(0)?;
            lock_file.seek(SeekFrom::Start(0))?;
            writeln!(&lock_file, "{}", std::process::id())?;
            lock_file.flush()?;
            Ok(Some((lock_file, lock_path)))
        }
        Err(_) => {
            let holder = std::fs::read_to_string(&lock_path)
                .ok()
                .and_then(|content| content.lines().next().map(str::to_string));
            log_pipe!();
            match holder {
                Some(pid) => log_warning!("Another instance is already running (PID {pid})"),
                None => log_warning!("Another instance is already running"),
            }
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn second_acquire_fails_while_lock_is_held() {
        let dir = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_RUNTIME_DIR", dir.path()) };
        crate::logger::Log::set_enabled(false);

        let first = acquire_lock().unwrap();
        assert!(first.is_some());
        let second = acquire_lock().unwrap();
        assert!(second.is_none());

        drop(first);
        crate::logger::Log::set_enabled(true);
        unsafe { std::env::remove_var("XDG_RUNTIME_DIR") };
    }
}
