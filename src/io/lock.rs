//! Single-instance enforcement through an exclusive lock file.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Held for the lifetime of the run loop; removes the lock file on drop.
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn default_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("waqtbar.lock")
}

/// PID recorded by the instance holding the lock, if readable.
pub fn read_lock_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}

/// Try to take the lock at `path`.
///
/// Returns `Ok(None)` when another instance already holds it.
pub fn acquire_lock(path: &Path) -> Result<Option<InstanceLock>> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(Some(InstanceLock {
        file,
        path: path.to_path_buf(),
    }))
}
