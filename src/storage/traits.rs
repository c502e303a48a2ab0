//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::Page;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt snapshot {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Implementations must accept concurrent `save_page` calls from many crawl
/// workers without a lock shared with the crawl state; each call gets its
/// own snapshot id.
pub trait Storage: Send + Sync {
    // ===== Snapshots =====

    /// Persists a page as a durable snapshot
    ///
    /// # Returns
    ///
    /// The snapshot id the page was written under
    fn save_page(&self, page: &Page) -> StorageResult<u64>;

    /// Lazily loads every snapshot of the run
    ///
    /// Unreadable or corrupt records are skipped, never fatal. Calling this
    /// again restarts the sequence from the beginning.
    fn load_pages(&self) -> StorageResult<Box<dyn Iterator<Item = Page> + Send + '_>>;

    /// Returns the id the next snapshot will be written under
    fn next_snapshot_id(&self) -> u64;

    /// Ensures future snapshot ids are at least `next`
    ///
    /// Called after recovery with the number of replayed records so a
    /// resumed run never reuses an old snapshot id.
    fn advance_snapshot_id(&self, next: u64);

    /// Removes every snapshot of the run
    fn clear(&self) -> StorageResult<()>;

    // ===== Export =====

    /// Writes the page's out-links, sorted, one per line
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A new export file was written
    /// * `Ok(false)` - The page is not exportable or was already exported
    fn export_links(&self, page: &Page) -> StorageResult<bool>;
}
