//! Bookmark storage.
//!
//! [`BookmarkStore`] is the seam the HTTP layer talks to. The only shipped
//! implementation, [`InMemoryStore`], keeps records in a `Vec` in insertion
//! order behind a `RwLock`; nothing survives a restart.

use crate::bookmark::Bookmark;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("bookmark id already exists: {0}")]
    DuplicateId(String),
    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// Ordered collection of bookmarks with unique ids.
pub trait BookmarkStore: Send + Sync {
    /// Snapshot of every record, in insertion order.
    fn list(&self) -> Result<Vec<Bookmark>, StoreError>;
    /// Look up a record by id.
    fn find_by_id(&self, id: &str) -> Result<Option<Bookmark>, StoreError>;
    /// Append a record. Fails if its id is already taken.
    fn append(&self, bookmark: Bookmark) -> Result<(), StoreError>;
    /// Remove a record by id, returning whether anything was removed.
    fn remove_by_id(&self, id: &str) -> Result<bool, StoreError>;
    /// Number of stored records.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Bookmark>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records. Later duplicates of an id are dropped.
    pub fn with_records(records: impl IntoIterator<Item = Bookmark>) -> Self {
        let mut unique: Vec<Bookmark> = Vec::new();
        for record in records {
            if unique.iter().any(|b| b.id == record.id) {
                tracing::warn!(bookmark_id = %record.id, "Dropping duplicate bookmark while seeding");
                continue;
            }
            unique.push(record);
        }
        Self {
            records: RwLock::new(unique),
        }
    }
}

impl BookmarkStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self.records.read()?.clone())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Bookmark>, StoreError> {
        Ok(self.records.read()?.iter().find(|b| b.id == id).cloned())
    }

    fn append(&self, bookmark: Bookmark) -> Result<(), StoreError> {
        let mut records = self.records.write()?;
        if records.iter().any(|b| b.id == bookmark.id) {
            return Err(StoreError::DuplicateId(bookmark.id));
        }
        records.push(bookmark);
        Ok(())
    }

    fn remove_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write()?;
        match records.iter().position(|b| b.id == id) {
            Some(index) => {
                // `remove`, not `swap_remove`: listing order is insertion order.
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read()?.len())
    }
}
