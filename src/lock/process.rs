//! Inter-process advisory lock
//!
//! One exclusive, whole-file OS lock on `<root>/mutex`, shared by every
//! cooperating process pointed at the same database directory.
//!
//! The lock is reentrant for its owner: `lock()` by the current holder is a
//! no-op, and `unlock()` by anyone other than the holder is a no-op. The
//! holder is identified by the `(process id, thread id)` recorded when the OS
//! lock was obtained. Each acquisition opens its own descriptor, so two
//! threads of one process contend on the OS lock exactly like two processes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use fs2::FileExt;

use crate::observability::{Event, Logger};
use crate::store::{StoreError, StoreResult};

/// Who holds the lock right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Owner {
    pid: u32,
    thread: ThreadId,
}

impl Owner {
    fn current() -> Self {
        Self {
            pid: process::id(),
            thread: thread::current().id(),
        }
    }
}

#[derive(Debug)]
struct Held {
    owner: Owner,
    file: File,
}

/// Exclusive advisory lock bound to one lock file.
#[derive(Debug)]
pub struct ProcessLock {
    path: PathBuf,
    held: Mutex<Option<Held>>,
}

impl ProcessLock {
    /// Binds a lock to `path`. Nothing is opened until the first `lock()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            held: Mutex::new(None),
        }
    }

    /// Returns the lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the calling thread of this process holds the lock.
    pub fn is_held_by_caller(&self) -> bool {
        self.state()
            .as_ref()
            .map_or(false, |held| held.owner == Owner::current())
    }

    /// Returns true if any thread of this process holds the lock.
    pub fn is_held(&self) -> bool {
        self.state().is_some()
    }

    /// Acquires the lock, blocking until it is available.
    ///
    /// Returns `Ok(false)` without blocking if the caller already holds it,
    /// `Ok(true)` if this call obtained the OS lock. The caller must pair a
    /// `true` with exactly one `unlock()`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Lock` if the lock file cannot be opened or the
    /// OS lock cannot be set.
    pub fn lock(&self) -> StoreResult<bool> {
        if self.is_held_by_caller() {
            return Ok(false);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.failure("open", e))?;

        // Blocks without holding `held`, so the current owner can still release.
        FileExt::lock_exclusive(&file).map_err(|e| self.failure("lock", e))?;

        *self.state() = Some(Held {
            owner: Owner::current(),
            file,
        });

        Logger::trace(
            Event::LockAcquire,
            &[("path", &self.path.display().to_string())],
        );
        Ok(true)
    }

    /// Releases the lock if the caller holds it, closing the descriptor.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Lock` if the OS refuses the release. The
    /// descriptor is closed regardless, which drops the OS lock with it.
    pub fn unlock(&self) -> StoreResult<()> {
        let held = {
            let mut state = self.state();
            match state.as_ref() {
                Some(held) if held.owner == Owner::current() => state.take(),
                _ => None,
            }
        };

        let Some(held) = held else {
            return Ok(());
        };

        let released = FileExt::unlock(&held.file);
        drop(held.file);
        released.map_err(|e| self.failure("unlock", e))?;

        Logger::trace(
            Event::LockRelease,
            &[("path", &self.path.display().to_string())],
        );
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, Option<Held>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn failure(&self, step: &str, source: std::io::Error) -> StoreError {
        Logger::fatal(
            Event::LockFailure,
            &[
                ("path", &self.path.display().to_string()),
                ("reason", &source.to_string()),
                ("step", step),
            ],
        );
        StoreError::lock(&self.path, source)
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Some(held) = self.held.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = FileExt::unlock(&held.file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_lock_creates_file() {
        let temp = TempDir::new().unwrap();
        let lock = ProcessLock::new(temp.path().join("mutex"));

        assert!(lock.lock().unwrap());
        assert!(temp.path().join("mutex").exists());
        lock.unlock().unwrap();

        assert_eq!(std::fs::metadata(temp.path().join("mutex")).unwrap().len(), 0);
    }

    #[test]
    fn test_lock_is_reentrant_for_owner() {
        let temp = TempDir::new().unwrap();
        let lock = ProcessLock::new(temp.path().join("mutex"));

        assert!(lock.lock().unwrap());
        assert!(!lock.lock().unwrap());
        assert!(lock.is_held_by_caller());

        lock.unlock().unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn test_unlock_without_holding_is_noop() {
        let temp = TempDir::new().unwrap();
        let lock = ProcessLock::new(temp.path().join("mutex"));

        lock.unlock().unwrap();
        lock.unlock().unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn test_unlock_from_other_thread_is_noop() {
        let temp = TempDir::new().unwrap();
        let lock = Arc::new(ProcessLock::new(temp.path().join("mutex")));

        assert!(lock.lock().unwrap());
        let other = Arc::clone(&lock);
        std::thread::spawn(move || {
            other.unlock().unwrap();
            assert!(!other.is_held_by_caller());
        })
        .join()
        .unwrap();

        assert!(lock.is_held_by_caller());
        lock.unlock().unwrap();
    }

    #[test]
    fn test_separate_locks_on_same_file_exclude_each_other() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mutex");
        let first = ProcessLock::new(&path);
        let second = Arc::new(ProcessLock::new(&path));

        assert!(first.lock().unwrap());

        let acquired = Arc::new(AtomicBool::new(false));
        let handle = {
            let second = Arc::clone(&second);
            let acquired = Arc::clone(&acquired);
            std::thread::spawn(move || {
                second.lock().unwrap();
                acquired.store(true, Ordering::SeqCst);
                second.unlock().unwrap();
            })
        };

        std::thread::sleep(Duration::from_millis(100));
        assert!(!acquired.load(Ordering::SeqCst));

        first.unlock().unwrap();
        handle.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_open_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let lock = ProcessLock::new(temp.path().join("missing").join("mutex"));

        let err = lock.lock().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "RECORDFS_LOCK_FAILURE");
        assert!(!lock.is_held());
    }
}
