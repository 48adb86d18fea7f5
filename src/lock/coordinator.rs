//! Scoped lock coordinator
//!
//! Composes the two lock tiers per operation kind:
//!
//! - write: inter-process lock, then the local lock exclusively
//! - read: the local lock shared, no inter-process lock
//!
//! The returned `OperationGuard` releases in reverse order exactly what it
//! acquired, on normal return, on `?` propagation and on unwinding.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use super::local::LocalLock;
use super::process::ProcessLock;
use crate::store::StoreResult;

/// Owner of both lock tiers for one database root.
#[derive(Debug)]
pub struct LockCoordinator {
    process: ProcessLock,
    local: LocalLock,
    outstanding: AtomicUsize,
}

/// Which kind of local access an operation holds.
enum LocalAccess<'a> {
    Shared { _guard: RwLockReadGuard<'a, ()> },
    Exclusive { _guard: RwLockWriteGuard<'a, ()> },
}

/// Locks held for the duration of one public operation.
#[must_use = "locks are released as soon as the guard is dropped"]
pub struct OperationGuard<'a> {
    coordinator: &'a LockCoordinator,
    local: Option<LocalAccess<'a>>,
    owns_process_lock: bool,
}

impl LockCoordinator {
    /// Creates a coordinator whose inter-process tier locks `lock_path`.
    pub fn new(lock_path: impl Into<PathBuf>) -> Self {
        Self {
            process: ProcessLock::new(lock_path),
            local: LocalLock::new(),
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Returns the inter-process lock.
    pub fn process_lock(&self) -> &ProcessLock {
        &self.process
    }

    /// Number of lock acquisitions (either tier) not yet released.
    ///
    /// Zero whenever no operation is in flight.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Enters a read operation: shared local access only.
    ///
    /// Readers are not isolated from writers in other processes.
    pub fn begin_read(&self) -> OperationGuard<'_> {
        let local = self.local.read();
        self.acquired();
        OperationGuard {
            coordinator: self,
            local: Some(LocalAccess::Shared { _guard: local }),
            owns_process_lock: false,
        }
    }

    /// Enters a write operation: inter-process lock, then exclusive local access.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Lock` if the inter-process lock cannot be taken.
    /// Nothing is held in that case.
    pub fn begin_write(&self) -> StoreResult<OperationGuard<'_>> {
        let owns_process_lock = self.process.lock()?;
        if owns_process_lock {
            self.acquired();
        }

        // From here on the guard owns whatever has been taken.
        let mut guard = OperationGuard {
            coordinator: self,
            local: None,
            owns_process_lock,
        };
        guard.local = Some(LocalAccess::Exclusive {
            _guard: self.local.write(),
        });
        self.acquired();
        Ok(guard)
    }

    fn acquired(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    fn released(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "lock released more often than acquired");
    }
}

impl OperationGuard<'_> {
    /// Returns true if this guard holds the local lock exclusively.
    pub fn is_exclusive(&self) -> bool {
        matches!(self.local, Some(LocalAccess::Exclusive { .. }))
    }

    /// Releases both tiers and reports a failed inter-process unlock.
    ///
    /// Dropping the guard releases the same locks but can only log the
    /// failure.
    pub fn finish(mut self) -> StoreResult<()> {
        self.release_local();
        self.release_process()
    }

    fn release_local(&mut self) {
        if let Some(access) = self.local.take() {
            drop(access);
            self.coordinator.released();
        }
    }

    fn release_process(&mut self) -> StoreResult<()> {
        if !self.owns_process_lock {
            return Ok(());
        }
        self.owns_process_lock = false;
        // The descriptor is closed even when unlock fails, so the OS lock is gone.
        self.coordinator.released();
        self.coordinator.process.unlock()
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.release_local();
        // Failure is already logged as LOCK_FAILURE by the process lock.
        let _ = self.release_process();
    }
}
