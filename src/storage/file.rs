//! File-backed storage: JSON page snapshots and plain-text link exports

use crate::state::Page;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::url::url_to_file_name;
use std::fs::{self, File, OpenOptions, ReadDir};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Sub-directory of a run directory that holds page snapshots
pub const PAGES_DIR_NAME: &str = "pages";

/// Extension of snapshot files
const SNAPSHOT_EXTENSION: &str = "json";

/// Derives the run directory name from the root URL
///
/// The host names the run; a non-default port is appended so two local
/// servers on different ports do not share snapshots.
///
/// # Examples
///
/// ```
/// use site_ranker::storage::run_dir_name;
///
/// assert_eq!(run_dir_name("https://Example.com/start"), "example.com");
/// assert_eq!(run_dir_name("http://127.0.0.1:8080/"), "127.0.0.1_8080");
/// ```
pub fn run_dir_name(root_url: &str) -> String {
    match Url::parse(root_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("unknown").to_lowercase();
            match url.port() {
                Some(port) => format!("{}_{}", host, port),
                None => host,
            }
        }
        Err(_) => url_to_file_name(root_url),
    }
}

/// Snapshot and export storage rooted at one run directory
#[derive(Debug)]
pub struct FileStorage {
    run_dir: PathBuf,
    pages_dir: PathBuf,
    next_id: AtomicU64,
}

impl FileStorage {
    /// Opens the run directory for `root_url` under `data_dir`
    ///
    /// Creates the run and snapshot directories if they are missing, and
    /// seeds the snapshot counter past every snapshot already on disk.
    pub fn open(data_dir: &Path, root_url: &str) -> StorageResult<Self> {
        let run_dir = data_dir.join(run_dir_name(root_url));
        let pages_dir = run_dir.join(PAGES_DIR_NAME);

        for dir in [&run_dir, &pages_dir] {
            if !dir.exists() {
                tracing::info!("Creating directory {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }

        let next_id = first_free_id(&pages_dir)?;
        tracing::debug!(
            "Snapshot storage at {} (next id {})",
            pages_dir.display(),
            next_id
        );

        Ok(Self {
            run_dir,
            pages_dir,
            next_id: AtomicU64::new(next_id),
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Path of the snapshot with the given id
    pub fn snapshot_path(&self, id: u64) -> PathBuf {
        self.pages_dir
            .join(format!("{}.{}", id, SNAPSHOT_EXTENSION))
    }

    /// Path of the plain-text export for a URL
    pub fn export_path(&self, url: &str) -> PathBuf {
        self.run_dir.join(url_to_file_name(url))
    }

    /// Iterates over the run's snapshots without loading them all at once
    pub fn snapshots(&self) -> StorageResult<SnapshotIter> {
        Ok(SnapshotIter {
            entries: fs::read_dir(&self.pages_dir)?,
        })
    }
}

impl Storage for FileStorage {
    fn save_page(&self, page: &Page) -> StorageResult<u64> {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let path = self.snapshot_path(id);

            // create_new so a stray file from an older run is never clobbered
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("Snapshot id {} already taken, skipping", id);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, page)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;

            tracing::trace!("Saved snapshot {} for {}", id, page.url);
            return Ok(id);
        }
    }

    fn load_pages(&self) -> StorageResult<Box<dyn Iterator<Item = Page> + Send + '_>> {
        Ok(Box::new(self.snapshots()?.filter_map(|record| match record {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("Skipping snapshot: {}", e);
                None
            }
        })))
    }

    fn next_snapshot_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    fn advance_snapshot_id(&self, next: u64) {
        self.next_id.fetch_max(next, Ordering::SeqCst);
    }

    fn clear(&self) -> StorageResult<()> {
        if self.pages_dir.exists() {
            fs::remove_dir_all(&self.pages_dir)?;
        }
        fs::create_dir_all(&self.pages_dir)?;
        self.next_id.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn export_links(&self, page: &Page) -> StorageResult<bool> {
        if !page.valid_mime {
            return Ok(false);
        }

        let path = self.export_path(&page.url);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut links: Vec<&str> = page.out_links.iter().map(String::as_str).collect();
        links.sort_unstable();

        let mut writer = BufWriter::new(file);
        for link in links {
            writeln!(writer, "{}", link)?;
        }
        writer.flush()?;

        Ok(true)
    }
}

/// Lazy iterator over the snapshots in a run's `pages` directory
///
/// Yields one result per snapshot file; files without the snapshot
/// extension are ignored.
#[derive(Debug)]
pub struct SnapshotIter {
    entries: ReadDir,
}

impl Iterator for SnapshotIter {
    type Item = StorageResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            let path = entry.path();
            if snapshot_id(&path).is_none() {
                continue;
            }

            return Some(read_snapshot(&path));
        }
    }
}

/// Reads and parses one snapshot file
fn read_snapshot(path: &Path) -> StorageResult<Page> {
    let file = File::open(path)?;
    let page: Page =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StorageError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(page.without_rejected_links())
}

/// Parses the numeric id out of a snapshot file name (`<id>.json`)
fn snapshot_id(path: &Path) -> Option<u64> {
    if path.extension()? != SNAPSHOT_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// Returns the first snapshot id that is safe to write after a restart
///
/// This is the larger of the number of snapshot files and one past the
/// highest id present, so gaps left by deleted files are never refilled.
fn first_free_id(pages_dir: &Path) -> io::Result<u64> {
    let mut count = 0u64;
    let mut max_next = 0u64;

    for entry in fs::read_dir(pages_dir)? {
        if let Some(id) = snapshot_id(&entry?.path()) {
            count += 1;
            max_next = max_next.max(id + 1);
        }
    }

    Ok(count.max(max_next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    const ROOT: &str = "http://example.com";

    fn open(dir: &TempDir) -> FileStorage {
        FileStorage::open(dir.path(), ROOT).unwrap()
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);

        assert!(storage.run_dir().ends_with("example.com"));
        assert!(storage.pages_dir().is_dir());
        assert_eq!(storage.next_snapshot_id(), 0);
    }

    #[test]
    fn test_save_and_load_pages() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);

        let page = Page::new(ROOT, "http://example.com/a", vec!["http://x.com/".into()], 1);
        let rejected = Page::rejected(ROOT, "http://example.com/b.png", 1);

        assert_eq!(storage.save_page(&page).unwrap(), 0);
        assert_eq!(storage.save_page(&rejected).unwrap(), 1);
        assert!(storage.snapshot_path(0).exists());

        let loaded: Vec<Page> = storage.load_pages().unwrap().collect();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&page));
        assert!(loaded.contains(&rejected));
    }

    #[test]
    fn test_load_is_restartable() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        storage
            .save_page(&Page::new(ROOT, "http://example.com/a", vec![], 1))
            .unwrap();

        assert_eq!(storage.load_pages().unwrap().count(), 1);
        assert_eq!(storage.load_pages().unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_skipped() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);

        storage
            .save_page(&Page::new(ROOT, "http://example.com/a", vec![], 1))
            .unwrap();
        fs::write(storage.snapshot_path(1), "{ not json").unwrap();
        fs::write(storage.pages_dir().join("notes.txt"), "ignored").unwrap();

        let results: Vec<_> = storage.snapshots().unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StorageError::Corrupt { .. }))));

        let pages: Vec<Page> = storage.load_pages().unwrap().collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://example.com/a");
    }

    #[test]
    fn test_rejected_snapshot_loads_without_links() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);

        fs::write(
            storage.snapshot_path(0),
            r#"{"root_url": "http://example.com", "url": "http://example.com/f.pdf",
                "out_links": ["http://example.com/x"], "depth": 1, "valid_mime": false}"#,
        )
        .unwrap();

        let pages: Vec<Page> = storage.load_pages().unwrap().collect();
        assert_eq!(pages.len(), 1);
        assert!(!pages[0].valid_mime);
        assert!(pages[0].out_links.is_empty());
    }

    #[test]
    fn test_reopen_seeds_counter_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let storage = open(&dir);
            for i in 0..3 {
                storage
                    .save_page(&Page::new(ROOT, format!("http://example.com/{}", i), vec![], 1))
                    .unwrap();
            }
        }

        let storage = open(&dir);
        assert_eq!(storage.next_snapshot_id(), 3);
        assert_eq!(
            storage
                .save_page(&Page::new(ROOT, "http://example.com/new", vec![], 1))
                .unwrap(),
            3
        );
        assert_eq!(storage.load_pages().unwrap().count(), 4);
    }

    #[test]
    fn test_counter_skips_past_gaps() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        fs::write(storage.snapshot_path(7), "{}").unwrap();

        let reopened = open(&dir);
        assert_eq!(reopened.next_snapshot_id(), 8);
    }

    #[test]
    fn test_save_never_overwrites_existing_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        fs::write(storage.snapshot_path(0), "keep me").unwrap();

        // Counter still at 0 because the file appeared after open()
        let id = storage
            .save_page(&Page::new(ROOT, "http://example.com/a", vec![], 1))
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(fs::read_to_string(storage.snapshot_path(0)).unwrap(), "keep me");
    }

    #[test]
    fn test_advance_snapshot_id_never_moves_backwards() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        storage.advance_snapshot_id(5);
        assert_eq!(storage.next_snapshot_id(), 5);
        storage.advance_snapshot_id(2);
        assert_eq!(storage.next_snapshot_id(), 5);
    }

    #[test]
    fn test_concurrent_saves_get_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(open(&dir));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    (0..10)
                        .map(|i| {
                            let url = format!("http://example.com/{}/{}", t, i);
                            storage.save_page(&Page::new(ROOT, url, vec![], 1)).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 80);
        assert_eq!(storage.load_pages().unwrap().count(), 80);
    }

    #[test]
    fn test_clear_removes_snapshots() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        storage
            .save_page(&Page::new(ROOT, "http://example.com/a", vec![], 1))
            .unwrap();

        storage.clear().unwrap();
        assert_eq!(storage.load_pages().unwrap().count(), 0);
        assert_eq!(storage.next_snapshot_id(), 0);
    }

    #[test]
    fn test_export_links_sorted_and_written_once() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        let page = Page::new(
            ROOT,
            "http://example.com/",
            vec![
                "http://example.com/z".into(),
                "http://example.com/a".into(),
                "http://other.com/".into(),
            ],
            0,
        );

        assert!(storage.export_links(&page).unwrap());
        let path = storage.export_path(&page.url);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "http://example.com/a\nhttp://example.com/z\nhttp://other.com/\n"
        );

        let mut changed = page.clone();
        changed.out_links = vec!["http://changed.com/".into()];
        assert!(!storage.export_links(&changed).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("other.com"));
    }

    #[test]
    fn test_export_skips_rejected_pages() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        let page = Page::rejected(ROOT, "http://example.com/file.pdf", 1);

        assert!(!storage.export_links(&page).unwrap());
        assert!(!storage.export_path(&page.url).exists());
    }

    #[test]
    fn test_run_dir_name() {
        assert_eq!(run_dir_name("http://example.com/"), "example.com");
        assert_eq!(run_dir_name("https://sub.example.com:8443/x"), "sub.example.com_8443");
    }
}
