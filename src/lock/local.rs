//! Intra-process reader/writer lock
//!
//! Many readers or one writer, blocking without timeout. The lock guards no
//! data of its own, so a poisoned lock is simply taken over.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory shared/exclusive lock held for the lifetime of a `Database`.
#[derive(Debug, Default)]
pub struct LocalLock {
    inner: RwLock<()>,
}

impl LocalLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until shared access is available.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until exclusive access is available.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
