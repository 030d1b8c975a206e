//! Extraction result storage.
//!
//! The store maps an original text chunk to the raw extraction record
//! produced for it. Keys are content addressed: a blake3 hash of the exact
//! chunk text. Writes to the same key are idempotent overwrites since the
//! value is a deterministic function of the chunk.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Content address of a text chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey([u8; 32]);

impl ChunkKey {
    /// Hashes the exact chunk text.
    #[must_use]
    pub fn of(chunk: &str) -> Self {
        Self(*blake3::hash(chunk.as_bytes()).as_bytes())
    }

    /// Returns the raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Storage trait for extraction results.
///
/// # Safety Considerations
/// - Implementations must tolerate concurrent writers to the same key
/// - `entries` should return a stable order for reproducible runs
pub trait ExtractionStore: Send + Sync {
    /// Raw record for a chunk, if one was stored.
    fn get(&self, chunk: &str) -> Result<Option<String>, StorageError>;

    /// Stores (or overwrites) the record for a chunk.
    fn put(&self, chunk: &str, record: String) -> Result<(), StorageError>;

    /// Returns true if a record exists for the chunk.
    fn contains(&self, chunk: &str) -> Result<bool, StorageError>;

    /// Number of stored chunks.
    fn len(&self) -> Result<usize, StorageError>;

    /// Returns true if nothing is stored.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// All `(chunk, record)` pairs.
    fn entries(&self) -> Result<Vec<(String, String)>, StorageError>;
}

impl<S: ExtractionStore + ?Sized> ExtractionStore for Arc<S> {
    fn get(&self, chunk: &str) -> Result<Option<String>, StorageError> {
        (**self).get(chunk)
    }

    fn put(&self, chunk: &str, record: String) -> Result<(), StorageError> {
        (**self).put(chunk, record)
    }

    fn contains(&self, chunk: &str) -> Result<bool, StorageError> {
        (**self).contains(chunk)
    }

    fn len(&self) -> Result<usize, StorageError> {
        (**self).len()
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        (**self).entries()
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    chunk: String,
    record: String,
}

/// Thread-safe in-memory extraction store.
///
/// # Examples
///
/// ```
/// use namebook::extraction::{ExtractionStore, InMemoryExtractionStore};
///
/// let store = InMemoryExtractionStore::new();
/// store.put("森の奥へ。", "[]".to_string()).unwrap();
/// assert!(store.contains("森の奥へ。").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryExtractionStore {
    state: RwLock<BTreeMap<ChunkKey, StoredRecord>>,
}

impl InMemoryExtractionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `(chunk, record)` pairs.
    pub fn from_entries<C, R>(entries: impl IntoIterator<Item = (C, R)>) -> Self
    where
        C: Into<String>,
        R: Into<String>,
    {
        let state = entries
            .into_iter()
            .map(|(chunk, record)| {
                let chunk = chunk.into();
                (
                    ChunkKey::of(&chunk),
                    StoredRecord {
                        chunk,
                        record: record.into(),
                    },
                )
            })
            .collect();
        Self {
            state: RwLock::new(state),
        }
    }
}

impl ExtractionStore for InMemoryExtractionStore {
    fn get(&self, chunk: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("extraction read"))?;
        Ok(state.get(&ChunkKey::of(chunk)).map(|s| s.record.clone()))
    }

    fn put(&self, chunk: &str, record: String) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("extraction write"))?;
        state.insert(
            ChunkKey::of(chunk),
            StoredRecord {
                chunk: chunk.to_string(),
                record,
            },
        );
        Ok(())
    }

    fn contains(&self, chunk: &str) -> Result<bool, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("extraction read"))?;
        Ok(state.contains_key(&ChunkKey::of(chunk)))
    }

    fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("extraction read"))?;
        Ok(state.len())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("extraction read"))?;
        Ok(state
            .values()
            .map(|s| (s.chunk.clone(), s.record.clone()))
            .collect())
    }
}
