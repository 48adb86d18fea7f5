//! Collection store
//!
//! One directory per collection, one file per record, named by the record's
//! identifier. Nothing here takes a lock: every function assumes the caller
//! already holds the `OperationGuard` appropriate for it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::record::{file_name_of, Record, RecordId};
use crate::observability::{Event, Logger};

/// A collection directory under the database root.
#[derive(Debug, Clone)]
pub struct CollectionDir {
    name: String,
    path: PathBuf,
    sync_writes: bool,
}

impl CollectionDir {
    pub fn new(root: &Path, name: &str, sync_writes: bool) -> Self {
        Self {
            name: name.to_string(),
            path: root.join(name),
            sync_writes,
        }
    }

    /// Directory name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the collection directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the file holding the record with identifier `id`.
    pub fn record_path<I: RecordId>(&self, id: &I) -> StoreResult<PathBuf> {
        Ok(self.path.join(file_name_of(id)?))
    }

    fn ensure_exists(&self) -> StoreResult<()> {
        if self.path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.path).map_err(|e| {
            StoreError::io(
                format!("Failed to create collection directory {}", self.path.display()),
                e,
            )
        })
    }

    /// Writes `record`, fully replacing any previous content.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the file exists and `overwrite` is false; the
    ///   stored value is left untouched
    /// - `Io` if the record cannot be encoded or the file cannot be written
    pub fn add<T: Record>(&self, record: &T, overwrite: bool) -> StoreResult<()> {
        let id = record.id();
        let file_name = file_name_of(&id)?;

        self.ensure_exists()?;

        let record_path = self.path.join(&file_name);
        if !overwrite && record_path.exists() {
            return Err(StoreError::AlreadyExists { path: record_path });
        }

        // Encode before touching the file so a failing encoder never truncates it
        let mut bytes = Vec::new();
        record.encode(&mut bytes).map_err(|e| {
            StoreError::io(format!("Failed to encode record {}", file_name), e)
        })?;

        let mut file = File::create(&record_path).map_err(|e| {
            StoreError::io(format!("Could not open file {}", record_path.display()), e)
        })?;
        file.write_all(&bytes).map_err(|e| {
            StoreError::io(format!("Failed to write {}", record_path.display()), e)
        })?;
        if self.sync_writes {
            file.sync_all().map_err(|e| {
                StoreError::io(format!("fsync failed for {}", record_path.display()), e)
            })?;
        }

        Logger::trace(
            Event::RecordWrite,
            &[
                ("bytes", &bytes.len().to_string()),
                ("collection", &self.name),
                ("id", &file_name),
            ],
        );
        Ok(())
    }

    /// Same as `add(record, true)`.
    pub fn update<T: Record>(&self, record: &T) -> StoreResult<()> {
        self.add(record, true)
    }

    /// Reads and decodes the record with identifier `id`.
    ///
    /// Returns `None` if the collection or the record file does not exist.
    pub fn get<T: Record>(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let record_path = self.record_path(id)?;

        let bytes = match fs::read(&record_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::io(
                    format!("Could not open file {}", record_path.display()),
                    e,
                ))
            }
        };

        let mut record = T::decode(&mut bytes.as_slice()).map_err(|source| {
            StoreError::Decode {
                path: record_path,
                source,
            }
        })?;
        record.restore_id(id.clone());
        Ok(Some(record))
    }

    /// Returns true if the record file is present. The file is not decoded.
    pub fn exists<I: RecordId>(&self, id: &I) -> StoreResult<bool> {
        Ok(self.record_path(id)?.exists())
    }

    /// Number of directory entries in the collection, 0 if it does not exist.
    ///
    /// Every entry counts, including files that are not records.
    pub fn count(&self) -> StoreResult<usize> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.list_failed(e)),
        };

        let mut count = 0;
        for entry in entries {
            entry.map_err(|e| self.list_failed(e))?;
            count += 1;
        }
        Ok(count)
    }

    /// Deletes the record file if present.
    ///
    /// Returns true when the file was deleted or was already absent, false
    /// when the deletion itself failed.
    pub fn remove<I: RecordId>(&self, id: &I) -> StoreResult<bool> {
        let record_path = self.record_path(id)?;
        self.ensure_exists()?;

        match fs::remove_file(&record_path) {
            Ok(()) => {
                Logger::trace(
                    Event::RecordRemove,
                    &[("collection", &self.name), ("id", &id.to_file_name())],
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => {
                Logger::error(
                    Event::RemoveFailed,
                    &[
                        ("path", &record_path.display().to_string()),
                        ("reason", &e.to_string()),
                    ],
                );
                Ok(false)
            }
        }
    }

    /// Recursively deletes the collection directory.
    ///
    /// Returns true if it was already absent or is now gone.
    pub fn clear(&self) -> bool {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                Logger::info(Event::CollectionClear, &[("collection", &self.name)]);
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => {
                Logger::error(
                    Event::ClearFailed,
                    &[
                        ("path", &self.path.display().to_string()),
                        ("reason", &e.to_string()),
                    ],
                );
                false
            }
        }
    }

    /// Names of all entries in the collection, in filesystem order.
    pub(crate) fn entry_names(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.list_failed(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.list_failed(e))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => Logger::warn(
                    Event::ScanSkippedEntry,
                    &[
                        ("collection", &self.name),
                        ("entry", &raw.to_string_lossy()),
                        ("reason", "not valid UTF-8"),
                    ],
                ),
            }
        }
        Ok(names)
    }

    fn list_failed(&self, e: io::Error) -> StoreError {
        StoreError::io(format!("Failed to list {}", self.path.display()), e)
    }
}
