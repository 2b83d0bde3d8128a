//! # Data Directory Lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use crate::domain::errors::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock on a data directory.
///
/// Held for the lifetime of the bridge, released on drop. The OS drops
/// the flock if the process dies, so there is no stale-lock cleanup.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl StoreLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock without waiting.
    ///
    /// # Errors
    ///
    /// `StoreError::Locked` if another process holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::io(data_dir, e))?;
        let lock_path = data_dir.join(Self::LOCK_FILE);

        // Not truncated on open: the current holder's PID must stay readable.
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;

        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked {
                pid: Self::read_existing_pid(&mut file),
                path: data_dir.to_path_buf(),
            });
        }

        let pid = std::process::id();
        Self::write_pid(&mut file, pid).map_err(|e| StoreError::io(&lock_path, e))?;

        debug!(path = %lock_path.display(), pid, "Data directory locked");
        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_pid(file: &mut File, pid: u32) -> io::Result<()> {
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{pid}")?;
        file.sync_all()
    }

    fn read_existing_pid(file: &mut File) -> Option<u32> {
        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        contents.trim().parse().ok()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        #[allow(clippy::incompatible_msrv)]
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
