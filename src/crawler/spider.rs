//! Crawl worker
//!
//! Every crawl worker runs the same loop: take a `(url, depth)` task off the
//! crawl queue, fetch it once, snapshot the resulting page, feed its links
//! back into the crawl queue, and hand the page to the rank queue.

use crate::crawler::fetcher::LinkFetcher;
use crate::crawler::queue::{Pop, WorkQueue};
use crate::output::CrawlStats;
use crate::state::{CrawlState, Page};
use crate::storage::Storage;
use std::sync::Arc;
use std::time::Duration;

/// A URL waiting to be crawled, with its distance from the root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Shared crawl worker logic; one instance is run by every worker in the pool
pub struct Spider {
    root_url: String,
    depth_limit: u32,
    idle_timeout: Duration,
    crawl_queue: Arc<WorkQueue<CrawlTask>>,
    rank_queue: Arc<WorkQueue<Page>>,
    state: Arc<CrawlState>,
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn LinkFetcher>,
    stats: Arc<CrawlStats>,
}

/// Retires a crawl task when dropped, even if processing panicked
///
/// Without this a panicking worker would leave its task outstanding forever
/// and the crawl queue would never close.
struct TaskGuard<'a>(&'a WorkQueue<CrawlTask>);

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

impl Spider {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root_url: impl Into<String>,
        depth_limit: u32,
        idle_timeout: Duration,
        crawl_queue: Arc<WorkQueue<CrawlTask>>,
        rank_queue: Arc<WorkQueue<Page>>,
        state: Arc<CrawlState>,
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn LinkFetcher>,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            root_url: root_url.into(),
            depth_limit,
            idle_timeout,
            crawl_queue,
            rank_queue,
            state,
            storage,
            fetcher,
            stats,
        }
    }

    /// Runs one worker until the crawl queue closes
    ///
    /// The queue closes once every task ever enqueued has been processed.
    /// Waiting longer than the idle timeout is not a reason to stop while
    /// other workers still hold tasks that may produce more work; it is only
    /// logged.
    pub async fn work(self: Arc<Self>, worker_id: usize) {
        tracing::debug!("Crawl worker {} started", worker_id);

        loop {
            match self.crawl_queue.pop_timeout(self.idle_timeout).await {
                Pop::Item(task) => {
                    let _guard = TaskGuard(&self.crawl_queue);
                    self.process(task).await;
                }
                Pop::Closed => break,
                Pop::Idle => {
                    tracing::debug!(
                        "Crawl worker {} idle for {:?}, {} tasks still in flight, {} pages visited",
                        worker_id,
                        self.idle_timeout,
                        self.crawl_queue.outstanding(),
                        self.stats.pages_visited()
                    );
                }
            }
        }

        tracing::debug!("Crawl worker {} finished", worker_id);
    }

    /// Processes a single crawl task
    ///
    /// This method:
    /// 1. Drops tasks beyond the depth limit
    /// 2. Claims the URL in the `seen` set, dropping it if already claimed
    /// 3. Fetches the page
    /// 4. Persists the snapshot and the plain-text export
    /// 5. Enqueues unseen out-links one level deeper
    /// 6. Forwards valid pages to ranking, at most once per URL
    ///
    /// Failures are logged and end processing of this task only.
    pub async fn process(&self, task: CrawlTask) {
        let CrawlTask { url, depth } = task;

        if depth > self.depth_limit {
            tracing::trace!("Skipping {} at depth {} (limit {})", url, depth, self.depth_limit);
            self.stats.record_skipped_depth();
            return;
        }

        // Claiming marks the URL seen before the fetch, so a URL that fails
        // is not retried within the run and two workers never fetch it both.
        if !self.state.mark_seen(&url) {
            tracing::trace!("Already seen {}", url);
            self.stats.record_skipped_seen();
            return;
        }

        tracing::info!("Crawling {} at depth {}", url, depth);

        let page = match self.crawl_page(&url, depth).await {
            Some(page) => page,
            None => return,
        };

        if page.can_expand(self.depth_limit) {
            self.enqueue_links(&page);
        }

        if page.valid_mime && self.state.mark_processed(&page.url) {
            self.rank_queue.push(page);
        }
    }

    /// Fetches and persists one page
    ///
    /// Returns None when the fetch failed or the snapshot could not be
    /// written; either way the URL produced no page.
    async fn crawl_page(&self, url: &str, depth: u32) -> Option<Page> {
        let page = match self.fetcher.fetch_links(url).await {
            Ok(links) => {
                self.stats.record_fetched();
                Page::new(&self.root_url, url, links, depth)
            }
            Err(e) if e.is_content_mismatch() => {
                tracing::info!("Rejecting {}: {}", url, e);
                self.stats.record_rejected();
                Page::rejected(&self.root_url, url, depth)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                self.stats.record_failed();
                return None;
            }
        };

        if let Err(e) = self.storage.save_page(&page) {
            tracing::error!("Failed to save snapshot for {}: {}", url, e);
            self.stats.record_failed();
            return None;
        }

        if let Err(e) = self.storage.export_links(&page) {
            tracing::warn!("Failed to export links for {}: {}", url, e);
        }

        Some(page)
    }

    /// Enqueues every out-link not yet seen at the next depth
    fn enqueue_links(&self, page: &Page) {
        let next_depth = page.depth + 1;
        let mut enqueued = 0;

        for link in &page.out_links {
            if self.state.is_seen(link) {
                continue;
            }
            if self.crawl_queue.push(CrawlTask::new(link.clone(), next_depth)) {
                enqueued += 1;
            }
        }

        tracing::debug!(
            "Enqueued {} of {} links from {} at depth {}",
            enqueued,
            page.out_links.len(),
            page.url,
            next_depth
        );
        self.stats.record_links_enqueued(enqueued);
    }
}
