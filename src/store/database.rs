//! Database facade
//!
//! Every public operation enters the lock coordinator, delegates to the
//! unlocked collection store or query layer, then releases its locks, also
//! when the delegate fails.
//!
//! # Locking
//!
//! | Operation | Inter-process lock | Local lock |
//! |-----------|--------------------|------------|
//! | `add`, `update`, `remove`, `clear`, `remove_if` | yes | exclusive |
//! | `get`, `exists`, `count`, `all`, `find_if`, `count_if`, `collections` | no | shared |
//!
//! Reads never take the inter-process lock. A reader is isolated from writers
//! in its own process but may observe a record file that another process is
//! in the middle of writing (a torn read). Workloads that need cross-process
//! read isolation must provide it themselves.
//!
//! # Setup
//!
//! Collection registration takes `&mut self` and must be finished before the
//! database is shared between threads:
//!
//! ```ignore
//! let mut db = Database::open("./Database")?;
//! db.register::<User>("Users")?;
//! let db = Arc::new(db);
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::collection::CollectionDir;
use super::config::DatabaseConfig;
use super::errors::{StoreError, StoreResult};
use super::record::{validate_file_name, Record};
use crate::lock::{LockCoordinator, ProcessLock};
use crate::observability::{Event, Logger};

/// Name of the inter-process lock file under the root.
pub const LOCK_FILE_NAME: &str = "mutex";

/// A file-per-record database rooted at one directory.
#[derive(Debug)]
pub struct Database {
    root: PathBuf,
    collection_names: HashMap<String, String>,
    sync_writes: bool,
    locks: LockCoordinator,
}

impl Database {
    /// Opens the database at `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            fs::create_dir_all(&root).map_err(|e| {
                StoreError::io(
                    format!("Failed to create database directory {}", root.display()),
                    e,
                )
            })?;
        }

        Logger::info(Event::DatabaseOpen, &[("root", &root.display().to_string())]);

        let locks = LockCoordinator::new(root.join(LOCK_FILE_NAME));
        Ok(Self {
            root,
            collection_names: HashMap::new(),
            sync_writes: false,
            locks,
        })
    }

    /// Opens the database described by `config`, applying its collection
    /// names, write durability and log level.
    pub fn with_config(config: &DatabaseConfig) -> StoreResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let mut db = Self::open(&config.root)?;
        db.sync_writes = config.sync_writes;
        for (default_name, dir_name) in &config.collections {
            db.register_name(default_name, dir_name)?;
        }
        Ok(db)
    }

    /// Stores records of type `T` under `<root>/<name>` instead of the
    /// type's default collection name.
    pub fn register<T: Record>(&mut self, name: &str) -> StoreResult<()> {
        self.register_name(T::COLLECTION, name)
    }

    fn register_name(&mut self, default_name: &str, name: &str) -> StoreResult<()> {
        validate_file_name(name)?;
        if name == LOCK_FILE_NAME {
            return Err(StoreError::InvalidIdentifier(name.to_string()));
        }
        self.collection_names
            .insert(default_name.to_string(), name.to_string());
        Logger::info(
            Event::CollectionRegistered,
            &[("collection", default_name), ("directory", name)],
        );
        Ok(())
    }

    /// Directory name used for records of type `T`.
    pub fn collection_name<T: Record>(&self) -> &str {
        self.collection_names
            .get(T::COLLECTION)
            .map(String::as_str)
            .unwrap_or(T::COLLECTION)
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The inter-process lock shared with other processes.
    pub fn process_lock(&self) -> &ProcessLock {
        self.locks.process_lock()
    }

    /// Lock acquisitions currently held by in-flight operations.
    ///
    /// Zero whenever no operation is running, whatever the outcome of earlier
    /// operations.
    pub fn outstanding_locks(&self) -> usize {
        self.locks.outstanding()
    }

    fn collection<T: Record>(&self) -> StoreResult<CollectionDir> {
        let name = self.collection_name::<T>();
        validate_file_name(name)?;
        Ok(CollectionDir::new(&self.root, name, self.sync_writes))
    }

    /// Stores `record`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a record with the same identifier is stored and
    ///   `overwrite` is false
    /// - `Io` if the record file cannot be written
    /// - `Lock` if the inter-process lock cannot be taken
    pub fn add<T: Record>(&self, record: &T, overwrite: bool) -> StoreResult<()> {
        let collection = self.collection::<T>()?;
        let guard = self.locks.begin_write()?;
        collection.add(record, overwrite)?;
        guard.finish()
    }

    /// Stores `record`, replacing any stored record with the same identifier.
    pub fn update<T: Record>(&self, record: &T) -> StoreResult<()> {
        let collection = self.collection::<T>()?;
        let guard = self.locks.begin_write()?;
        collection.update(record)?;
        guard.finish()
    }

    /// Loads the record with identifier `id`, or `None` if it is not stored.
    pub fn get<T: Record>(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.get(id)
    }

    /// Returns true if a record with identifier `id` is stored.
    pub fn exists<T: Record>(&self, id: &T::Id) -> StoreResult<bool> {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.exists(id)
    }

    /// Number of entries in the collection of `T`.
    pub fn count<T: Record>(&self) -> StoreResult<usize> {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.count()
    }

    /// Deletes the record with identifier `id`.
    ///
    /// Returns true if the record is gone afterwards (including when it was
    /// never stored), false if the deletion failed.
    pub fn remove<T: Record>(&self, id: &T::Id) -> StoreResult<bool> {
        let collection = self.collection::<T>()?;
        let guard = self.locks.begin_write()?;
        let removed = collection.remove(id)?;
        guard.finish()?;
        Ok(removed)
    }

    /// Deletes the whole collection of `T`.
    pub fn clear<T: Record>(&self) -> StoreResult<bool> {
        let collection = self.collection::<T>()?;
        let guard = self.locks.begin_write()?;
        let cleared = collection.clear();
        guard.finish()?;
        Ok(cleared)
    }

    /// Every stored record of type `T`, in filesystem order.
    pub fn all<T: Record>(&self) -> StoreResult<Vec<T>> {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.all()
    }

    /// Some stored record satisfying `predicate`, or `None`.
    pub fn find_if<T, P>(&self, predicate: P) -> StoreResult<Option<T>>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.find_if(predicate)
    }

    /// Number of stored records satisfying `predicate`.
    pub fn count_if<T, P>(&self, predicate: P) -> StoreResult<usize>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let collection = self.collection::<T>()?;
        let _guard = self.locks.begin_read();
        collection.count_if(predicate)
    }

    /// Deletes every stored record satisfying `predicate`.
    ///
    /// Returns true only if every deletion succeeded.
    pub fn remove_if<T, P>(&self, predicate: P) -> StoreResult<bool>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let collection = self.collection::<T>()?;
        let guard = self.locks.begin_write()?;
        let removed = collection.remove_if(predicate)?;
        guard.finish()?;
        Ok(removed)
    }

    /// Names of the collection directories under the root, sorted.
    pub fn collections(&self) -> StoreResult<Vec<String>> {
        let _guard = self.locks.begin_read();

        let entries = fs::read_dir(&self.root).map_err(|e| self.list_failed(e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.list_failed(e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| self.list_failed(e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_failed(&self, e: io::Error) -> StoreError {
        StoreError::io(format!("Failed to list {}", self.root.display()), e)
    }
}
