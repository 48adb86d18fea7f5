//! Scan-based queries over one collection
//!
//! Full scan and predicate search, count and delete, built on the collection
//! store's unlocked primitives. The public `Database` methods hold the lock
//! for the whole scan, so a scan is atomic with respect to other threads of
//! this process (not other processes).
//!
//! Entries are visited in the order the filesystem reports them, which is
//! neither sorted nor stable.

use super::collection::CollectionDir;
use super::errors::StoreResult;
use super::record::{id_from_file_name, Record};
use crate::observability::{Event, Logger};

impl CollectionDir {
    /// Visits every decodable record until `visit` returns false.
    ///
    /// Entries whose name is not a canonical identifier are skipped, as are
    /// files that disappear between listing and reading.
    fn scan<T, F>(&self, mut visit: F) -> StoreResult<()>
    where
        T: Record,
        F: FnMut(T::Id, T) -> StoreResult<bool>,
    {
        for name in self.entry_names()? {
            let Some(id) = id_from_file_name::<T::Id>(&name) else {
                Logger::warn(
                    Event::ScanSkippedEntry,
                    &[
                        ("collection", self.name()),
                        ("entry", &name),
                        ("reason", "not a record identifier"),
                    ],
                );
                continue;
            };

            let Some(record) = self.get::<T>(&id)? else {
                continue;
            };

            if !visit(id, record)? {
                break;
            }
        }
        Ok(())
    }

    /// Every record in the collection.
    pub fn all<T: Record>(&self) -> StoreResult<Vec<T>> {
        let mut records = Vec::with_capacity(self.count()?);
        self.scan::<T, _>(|_, record| {
            records.push(record);
            Ok(true)
        })?;
        Ok(records)
    }

    /// First record, in scan order, for which `predicate` holds.
    pub fn find_if<T, P>(&self, mut predicate: P) -> StoreResult<Option<T>>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let mut found = None;
        self.scan::<T, _>(|_, record| {
            if predicate(&record) {
                found = Some(record);
                return Ok(false);
            }
            Ok(true)
        })?;
        Ok(found)
    }

    /// Number of records for which `predicate` holds.
    pub fn count_if<T, P>(&self, mut predicate: P) -> StoreResult<usize>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let mut count = 0;
        self.scan::<T, _>(|_, record| {
            if predicate(&record) {
                count += 1;
            }
            Ok(true)
        })?;
        Ok(count)
    }

    /// Removes every record for which `predicate` holds.
    ///
    /// Returns true only if every individual removal succeeded.
    pub fn remove_if<T, P>(&self, mut predicate: P) -> StoreResult<bool>
    where
        T: Record,
        P: FnMut(&T) -> bool,
    {
        let mut all_removed = true;
        self.scan::<T, _>(|id, record| {
            if predicate(&record) {
                all_removed &= self.remove(&id)?;
            }
            Ok(true)
        })?;
        Ok(all_removed)
    }
}
