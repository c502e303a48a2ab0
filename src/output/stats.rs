//! Crawl statistics
//!
//! Workers bump lock-free counters as they go; the coordinator takes a
//! plain-value snapshot at the end for logging and the report.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every worker
#[derive(Debug, Default)]
pub struct CrawlStats {
    fetched: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    skipped_seen: AtomicU64,
    skipped_depth: AtomicU64,
    links_enqueued: AtomicU64,
    recovered: AtomicU64,
    ranked: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched as HTML
    pub fetched: u64,
    /// Resources rejected for a non-HTML content type
    pub rejected: u64,
    /// Fetch attempts that produced no page
    pub failed: u64,
    /// Tasks dropped because the URL was already seen
    pub skipped_seen: u64,
    /// Tasks dropped because they exceeded the depth limit
    pub skipped_depth: u64,
    /// Crawl tasks enqueued from discovered links
    pub links_enqueued: u64,
    /// Snapshots replayed during recovery
    pub recovered: u64,
    /// Pages ranked
    pub ranked: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_seen(&self) {
        self.skipped_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_depth(&self) {
        self.skipped_depth.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links_enqueued(&self, count: u64) {
        self.links_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_recovered(&self, count: u64) {
        self.recovered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_ranked(&self) {
        self.ranked.fetch_add(1, Ordering::Relaxed);
    }

    /// Pages visited so far (fetched or rejected)
    pub fn pages_visited(&self) -> u64 {
        self.fetched.load(Ordering::Relaxed) + self.rejected.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            fetched: self.fetched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped_seen: self.skipped_seen.load(Ordering::Relaxed),
            skipped_depth: self.skipped_depth.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            recovered: self.recovered.load(Ordering::Relaxed),
            ranked: self.ranked.load(Ordering::Relaxed),
        }
    }
}

impl CrawlStatistics {
    /// Total fetch attempts made this run
    pub fn attempts(&self) -> u64 {
        self.fetched + self.rejected + self.failed
    }

    /// Share of fetch attempts that produced an HTML page, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempts = self.attempts();
        if attempts == 0 {
            return 0.0;
        }
        (self.fetched as f64 / attempts as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");
    println!("  Pages fetched:        {}", stats.fetched);
    println!("  Rejected (not HTML):  {}", stats.rejected);
    println!("  Failed:               {}", stats.failed);
    println!("  Skipped (seen):       {}", stats.skipped_seen);
    println!("  Skipped (depth):      {}", stats.skipped_depth);
    println!("  Links enqueued:       {}", stats.links_enqueued);
    println!("  Recovered snapshots:  {}", stats.recovered);
    println!("  Pages ranked:         {}", stats.ranked);
    println!(
        "\nSuccess Rate: {:.1}% ({} / {} attempts)",
        stats.success_rate(),
        stats.fetched,
        stats.attempts()
    );
}
