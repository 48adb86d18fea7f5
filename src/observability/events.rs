//! Observable events in recordfs
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Database root opened (created if absent)
    DatabaseOpen,
    /// Configuration file loaded
    ConfigLoaded,
    /// A record type was bound to a directory name
    CollectionRegistered,

    // Writes
    /// Record file written
    RecordWrite,
    /// Record file removed
    RecordRemove,
    /// Record file could not be removed
    RemoveFailed,
    /// Collection directory removed
    CollectionClear,
    /// Collection directory could not be removed
    ClearFailed,

    // Scans
    /// Directory entry that does not name a record was skipped
    ScanSkippedEntry,

    // Locking
    /// Inter-process lock acquired
    LockAcquire,
    /// Inter-process lock released
    LockRelease,
    /// Inter-process lock could not be opened, set or released
    LockFailure,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DatabaseOpen => "DATABASE_OPEN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CollectionRegistered => "COLLECTION_REGISTERED",

            Event::RecordWrite => "RECORD_WRITE",
            Event::RecordRemove => "RECORD_REMOVE",
            Event::RemoveFailed => "REMOVE_FAILED",
            Event::CollectionClear => "COLLECTION_CLEAR",
            Event::ClearFailed => "CLEAR_FAILED",

            Event::ScanSkippedEntry => "SCAN_SKIPPED_ENTRY",

            Event::LockAcquire => "LOCK_ACQUIRE",
            Event::LockRelease => "LOCK_RELEASE",
            Event::LockFailure => "LOCK_FAILURE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::LockFailure)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
