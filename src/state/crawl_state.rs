use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// The de-duplication and completion sets shared by every worker
///
/// `seen` holds every URL a fetch has been attempted for; `processed` holds
/// every URL whose page has been handed to ranking. Each set sits behind its
/// own lock so crawl admission and rank admission never contend. Locks are
/// held only for a single check-and-insert, never across I/O. Both sets only
/// grow.
#[derive(Debug, Default)]
pub struct CrawlState {
    seen: Mutex<HashSet<String>>,
    processed: Mutex<HashSet<String>>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as seen, returning true if it was not seen before
    ///
    /// Exactly one caller wins the claim for any URL, which is what keeps a
    /// URL from being fetched twice in one run.
    pub fn mark_seen(&self, url: &str) -> bool {
        let mut seen = lock(&self.seen);
        if seen.contains(url) {
            return false;
        }
        seen.insert(url.to_string())
    }

    /// Returns true if a fetch has already been attempted for the URL
    pub fn is_seen(&self, url: &str) -> bool {
        lock(&self.seen).contains(url)
    }

    /// Marks a URL as processed, returning true if it was not processed before
    pub fn mark_processed(&self, url: &str) -> bool {
        let mut processed = lock(&self.processed);
        if processed.contains(url) {
            return false;
        }
        processed.insert(url.to_string())
    }

    /// Returns true if the URL's page has already been handed to ranking
    pub fn is_processed(&self, url: &str) -> bool {
        lock(&self.processed).contains(url)
    }

    pub fn seen_count(&self) -> usize {
        lock(&self.seen).len()
    }

    pub fn processed_count(&self) -> usize {
        lock(&self.processed).len()
    }

    /// Copies the seen set, for reporting and tests
    pub fn seen_urls(&self) -> HashSet<String> {
        lock(&self.seen).clone()
    }

    /// Copies the processed set, for reporting and tests
    pub fn processed_urls(&self) -> HashSet<String> {
        lock(&self.processed).clone()
    }
}

/// Acquires a set guard, recovering the data if a worker panicked mid-insert
///
/// A poisoned set is still consistent: every mutation is a single insert.
fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
