//! Store error types
//!
//! Error codes:
//! - RECORDFS_ALREADY_EXISTS (ERROR severity)
//! - RECORDFS_IO_FAILURE (ERROR severity)
//! - RECORDFS_LOCK_FAILURE (FATAL severity)
//! - RECORDFS_INVALID_IDENTIFIER (ERROR severity)
//! - RECORDFS_DECODE_FAILURE (ERROR severity)
//! - RECORDFS_CONFIG_ERROR (ERROR severity)
//!
//! A missing record is not an error: lookups return `None`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::observability::Severity;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// `add` without overwrite targeted an identifier already on disk
    #[error("Object file {} already exists. Cannot overwrite", .path.display())]
    AlreadyExists { path: PathBuf },

    /// A file or directory could not be opened, created, written or listed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The inter-process lock file could not be opened, locked or unlocked
    #[error("Failed to lock mutex file {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An identifier or collection name is not a usable file name
    #[error("Invalid identifier '{0}': must be a non-empty file name without path separators")]
    InvalidIdentifier(String),

    /// A record file exists but its bytes could not be decoded
    #[error("Could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create an I/O failure with context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a lock failure for the given lock file
    pub fn lock(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Lock {
            path: path.into(),
            source,
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::AlreadyExists { .. } => "RECORDFS_ALREADY_EXISTS",
            StoreError::Io { .. } => "RECORDFS_IO_FAILURE",
            StoreError::Lock { .. } => "RECORDFS_LOCK_FAILURE",
            StoreError::InvalidIdentifier(_) => "RECORDFS_INVALID_IDENTIFIER",
            StoreError::Decode { .. } => "RECORDFS_DECODE_FAILURE",
            StoreError::Config(_) => "RECORDFS_CONFIG_ERROR",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Lock { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Lock protocol failures abort the enclosing operation before any mutation
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether the caller can recover by choosing another identifier
    /// or passing `overwrite`
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}
