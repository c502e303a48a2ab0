//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler writes to disk:
//! - One JSON snapshot per crawled page, the sole input to crash recovery
//! - Plain-text link exports, one file per successfully fetched page
//!
//! # Layout
//!
//! ```text
//! <data-dir>/<run-dir>/pages/0.json
//! <data-dir>/<run-dir>/pages/1.json
//! <data-dir>/<run-dir>/http%3A%2F%2Fexample.com%2F.txt
//! ```

mod file;
mod traits;

pub use file::{run_dir_name, FileStorage, SnapshotIter, PAGES_DIR_NAME};
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Opens (creating if needed) the snapshot storage for a crawl run
///
/// # Arguments
///
/// * `data_dir` - Directory that holds one folder per crawl run
/// * `root_url` - The run's root URL; its host names the run folder
///
/// # Returns
///
/// * `Ok(FileStorage)` - Storage with its snapshot counter seeded from disk
/// * `Err(StorageError)` - The run directories could not be created
pub fn open_storage(data_dir: &Path, root_url: &str) -> StorageResult<FileStorage> {
    FileStorage::open(data_dir, root_url)
}
