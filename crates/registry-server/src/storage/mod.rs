//! Storage abstraction for the application registry
//!
//! The registry persists one keyed collection mapping application id to a
//! serialized JSON record, plus a secondary index over the owning user
//! supporting equality search. This module defines the contract the core
//! requires from any such store: point lookup by key, upsert, delete, full
//! iteration, and predicate-qualified iteration. How records are physically
//! indexed is the backend's business.
//!
//! Two raw iterator shapes exist because the two access paths expose the
//! same logical entity differently: a full scan yields key/document pairs
//! that still need decoding, while an index-backed search yields records the
//! engine already decoded to evaluate its predicate. The repository's
//! filtering cursor normalizes both shapes behind one typed contract.

pub mod memory;

pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use registry_core::{Application, RegistryError};
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("corrupt stored value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("cursor is closed")]
    CursorClosed,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => RegistryError::NotFound,
            corrupt @ StoreError::Corrupt { .. } => RegistryError::Decode(corrupt.to_string()),
            other => RegistryError::Store(other.to_string()),
        }
    }
}

/// One raw entry produced by a store iterator
///
/// `Record` comes from the index-backed search path; `Document` comes from
/// the full-scan path and still needs a JSON decode.
#[derive(Debug, Clone)]
pub enum RawEntry {
    /// An already-typed application record
    Record(Application),
    /// A key/serialized-value pair requiring decode
    Document { key: String, value: String },
}

/// Pull iterator over raw store entries
///
/// Created per query, consumed by at most one reader, closed by the caller.
/// `close` must be idempotent. Implementations need not be thread-safe; the
/// filtering cursor above them serializes access.
pub trait RawIter: Send {
    /// True while entries remain
    fn has_next(&mut self) -> bool;

    /// Produce the next entry; calling past exhaustion or after `close` is
    /// an error
    fn next(&mut self) -> Result<RawEntry, StoreError>;

    /// Release the underlying result set
    fn close(&mut self) -> Result<(), StoreError>;
}

/// Fields backed by a secondary index supporting equality search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexField {
    /// `info.created_by` — the owning user principal
    CreatedBy,
}

/// Record store contract
///
/// Implementations must be thread-safe and support concurrent access. Values
/// are serialized application records; the store itself treats them as
/// opaque documents except where the secondary index reaches into them.
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Point lookup by application id
    async fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Upsert a serialized record
    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a record; deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Iterate every stored document as key/value pairs requiring decode
    async fn list_all(&self) -> Result<Box<dyn RawIter>, StoreError>;

    /// Equality search against a secondary index, yielding typed records
    async fn search(&self, field: IndexField, value: &str) -> Result<Box<dyn RawIter>, StoreError>;
}
