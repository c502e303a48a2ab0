//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - Opening run storage and seeding the crawl queue with the root
//! - Replaying snapshots from an interrupted run
//! - Running the crawl and rank worker pools
//! - Closing the rank queue once crawling is over and collecting the ranks

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::LinkFetcher;
use crate::crawler::queue::WorkQueue;
use crate::crawler::ranker::Ranker;
use crate::crawler::spider::{CrawlTask, Spider};
use crate::output::{CrawlReport, CrawlStats};
use crate::state::{CrawlState, Page};
use crate::storage::{open_storage, Storage};
use crate::CrawlerError;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Main crawler coordinator structure
pub struct Coordinator {
    root_url: String,
    config: CrawlerConfig,
    state: Arc<CrawlState>,
    crawl_queue: Arc<WorkQueue<CrawlTask>>,
    rank_queue: Arc<WorkQueue<Page>>,
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn LinkFetcher>,
    stats: Arc<CrawlStats>,
}

impl Coordinator {
    /// Creates a coordinator backed by file storage under the configured data dir
    ///
    /// # Arguments
    ///
    /// * `root_url` - Absolute, scheme-qualified root URL
    /// * `config` - The crawler configuration
    /// * `fetcher` - The collaborator that turns URLs into out-links
    /// * `fresh` - Discard snapshots of a previous run instead of resuming it
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Seeded and recovered, ready to run
    /// * `Err(CrawlerError)` - Storage could not be opened or cleared
    pub fn new(
        root_url: &str,
        config: &Config,
        fetcher: Arc<dyn LinkFetcher>,
        fresh: bool,
    ) -> Result<Self, CrawlerError> {
        let storage = open_storage(&config.output.data_dir, root_url)?;

        if fresh {
            tracing::info!("Discarding snapshots in {}", storage.pages_dir().display());
            storage.clear()?;
        }

        Ok(Self::with_storage(
            root_url,
            config.crawler.clone(),
            Arc::new(storage),
            fetcher,
        ))
    }

    /// Creates a coordinator over an already opened storage backend
    ///
    /// Seeds the crawl queue with the root at depth 0, then replays every
    /// snapshot the storage holds.
    pub fn with_storage(
        root_url: &str,
        config: CrawlerConfig,
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn LinkFetcher>,
    ) -> Self {
        let coordinator = Self {
            root_url: root_url.to_string(),
            config,
            state: Arc::new(CrawlState::new()),
            crawl_queue: Arc::new(WorkQueue::auto_close()),
            rank_queue: Arc::new(WorkQueue::new()),
            storage,
            fetcher,
            stats: Arc::new(CrawlStats::new()),
        };

        coordinator
            .crawl_queue
            .push(CrawlTask::new(coordinator.root_url.clone(), 0));
        coordinator.recover();

        coordinator
    }

    /// Rebuilds crawl state from the snapshots of an interrupted run
    ///
    /// For every snapshot whose URL is neither the root nor already seen:
    /// 1. The URL is marked seen so it is never fetched again
    /// 2. Valid pages below the depth limit re-enqueue their out-links
    /// 3. Valid pages are marked processed and queued for ranking
    ///
    /// Rejected (non-HTML) snapshots are only marked seen. Replaying the
    /// same snapshots again changes nothing, because every page it would
    /// touch is already seen.
    ///
    /// # Returns
    ///
    /// The number of snapshots read
    pub fn recover(&self) -> u64 {
        let pages = match self.storage.load_pages() {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("Could not read snapshots, starting from scratch: {}", e);
                return 0;
            }
        };

        let mut replayed = 0u64;
        let mut restored = 0u64;

        for page in pages {
            replayed += 1;

            if page.url == self.root_url || !self.state.mark_seen(&page.url) {
                continue;
            }
            restored += 1;

            if !page.valid_mime {
                continue;
            }

            if page.depth < self.config.max_depth {
                for link in page.out_links.iter().filter(|l| **l != self.root_url) {
                    self.crawl_queue
                        .push(CrawlTask::new(link.clone(), page.depth + 1));
                }
            }

            if self.state.mark_processed(&page.url) {
                self.rank_queue.push(page);
            }
        }

        if replayed > 0 {
            tracing::info!(
                "Restored {} pages from {} snapshots of a previous session",
                restored,
                replayed
            );
        }

        self.storage.advance_snapshot_id(replayed);
        self.stats.record_recovered(replayed);
        replayed
    }

    /// Runs the crawl to completion
    ///
    /// 1. Starts the crawl pool and the rank pool
    /// 2. Waits for every crawl worker to exit
    /// 3. Closes the rank queue, the "crawling finished" signal
    /// 4. Waits for the rank pool to drain the queue and stop
    /// 5. Returns the ranked pages as a report
    pub async fn run(self) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (depth limit {}, {} crawl / {} rank workers)",
            self.root_url,
            self.config.max_depth,
            self.config.crawl_workers,
            self.config.rank_workers
        );

        let spider = Arc::new(Spider::new(
            self.root_url.clone(),
            self.config.max_depth,
            self.config.idle_timeout(),
            Arc::clone(&self.crawl_queue),
            Arc::clone(&self.rank_queue),
            Arc::clone(&self.state),
            Arc::clone(&self.storage),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.stats),
        ));
        let ranker = Arc::new(Ranker::new(
            Arc::clone(&self.rank_queue),
            Arc::clone(&self.stats),
        ));

        let crawl_workers: Vec<JoinHandle<()>> = (0..self.config.crawl_workers)
            .map(|id| tokio::spawn(Arc::clone(&spider).work(id)))
            .collect();
        let rank_workers: Vec<JoinHandle<()>> = (0..self.config.rank_workers)
            .map(|id| tokio::spawn(Arc::clone(&ranker).work(id)))
            .collect();

        join_all("Crawl", crawl_workers).await;

        if !self.crawl_queue.is_empty() {
            tracing::warn!(
                "{} crawl tasks left unprocessed",
                self.crawl_queue.len()
            );
        }
        tracing::info!(
            "Done crawling: {} URLs seen, {} pages sent to ranking",
            self.state.seen_count(),
            self.state.processed_count()
        );

        self.rank_queue.close();
        join_all("Rank", rank_workers).await;

        let stats = self.stats.snapshot();
        tracing::info!(
            "Crawl completed: {} fetched, {} rejected, {} failed, {} ranked",
            stats.fetched,
            stats.rejected,
            stats.failed,
            stats.ranked
        );

        Ok(CrawlReport::new(
            self.root_url.clone(),
            self.config.max_depth,
            started_at,
            Utc::now(),
            stats,
            ranker.take_results(),
        ))
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn crawl_queue(&self) -> &WorkQueue<CrawlTask> {
        &self.crawl_queue
    }

    pub fn rank_queue(&self) -> &WorkQueue<Page> {
        &self.rank_queue
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }
}

/// Waits for every worker of a pool, logging workers that panicked
async fn join_all(pool: &str, handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("{} worker failed: {}", pool, e);
        }
    }
}
