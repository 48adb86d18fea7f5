//! File-per-record storage engine
//!
//! On-disk layout:
//!
//! ```text
//! <root>/
//!   mutex                      inter-process lock file, zero-length
//!   <collection>/
//!     <id-as-string>           encoded bytes of one record
//! ```
//!
//! # Design Principles
//!
//! - One directory per record type, one file per record
//! - The identifier is the only index
//! - Last completed write wins; no journal, no rollback
//! - Writes are serialized across processes, reads only within one process
//! - Absence is a normal outcome (`None`), never an error

mod collection;
mod config;
mod database;
mod errors;
mod query;
mod record;

pub use collection::CollectionDir;
pub use config::DatabaseConfig;
pub use database::{Database, LOCK_FILE_NAME};
pub use errors::{StoreError, StoreResult};
pub use record::{file_name_of, id_from_file_name, validate_file_name, RawRecord, Record, RecordId};
