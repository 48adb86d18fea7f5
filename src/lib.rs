//! recordfs - an embedded file-per-record storage engine
//!
//! Records of one type live in one directory under the database root, one
//! file per record named by its identifier. Threads of one process and
//! independent processes may share a root: writes are serialized by an
//! advisory lock on `<root>/mutex` plus an in-process reader/writer lock.

pub mod cli;
pub mod lock;
pub mod observability;
pub mod store;

pub use store::{Database, DatabaseConfig, RawRecord, Record, RecordId, StoreError, StoreResult};
