//! Rank worker
//!
//! Rank workers take pages off the rank queue and score them by link
//! locality: the share of a page's out-links that stay on the page's own
//! domain. Workers block on the queue and stop once it is closed and empty,
//! so no page handed to ranking is ever dropped.

use crate::crawler::queue::WorkQueue;
use crate::output::CrawlStats;
use crate::state::Page;
use crate::url::same_domain;
use std::sync::{Arc, Mutex};

/// Decimal digits kept in a rank
const RANK_PRECISION: usize = 2;

/// Computes the link-locality rank of a page
///
/// Out-links on the same host (port ignored, subdomains distinct) as `url` count as
/// "same", all others as "different". The rank is `same / (same + different)`
/// rounded to two decimals, or 0 for a page without out-links.
///
/// # Examples
///
/// ```
/// use site_ranker::crawler::compute_rank;
///
/// let links = vec![
///     "http://example.com/a".to_string(),
///     "http://example.com/b".to_string(),
///     "http://example.com/c".to_string(),
///     "http://other.com/".to_string(),
/// ];
/// assert_eq!(compute_rank("http://example.com/", &links), 0.75);
/// assert_eq!(compute_rank("http://example.com/", &[]), 0.0);
/// ```
pub fn compute_rank(url: &str, out_links: &[String]) -> f64 {
    let same = out_links
        .iter()
        .filter(|link| same_domain(url, link))
        .count();
    let different = out_links.len() - same;

    if same == 0 && different == 0 {
        return 0.0;
    }

    round_rank(same as f64 / (same + different) as f64)
}

/// Rounds through decimal formatting, so exact halves go to the even digit
fn round_rank(value: f64) -> f64 {
    format!("{:.*}", RANK_PRECISION, value)
        .parse()
        .unwrap_or(value)
}

/// Sets `page.rank` from its out-links
pub fn rank_page(page: &mut Page) {
    page.rank = compute_rank(&page.url, &page.out_links);
}

/// Shared rank worker logic plus the accumulated results
pub struct Ranker {
    rank_queue: Arc<WorkQueue<Page>>,
    ranked: Mutex<Vec<Page>>,
    stats: Arc<CrawlStats>,
}

impl Ranker {
    pub fn new(rank_queue: Arc<WorkQueue<Page>>, stats: Arc<CrawlStats>) -> Self {
        Self {
            rank_queue,
            ranked: Mutex::new(Vec::new()),
            stats,
        }
    }

    /// Runs one worker until the rank queue is closed and drained
    pub async fn work(self: Arc<Self>, worker_id: usize) {
        tracing::debug!("Rank worker {} started", worker_id);

        while let Some(mut page) = self.rank_queue.pop().await {
            rank_page(&mut page);
            tracing::debug!("Ranked {} at {:.2}", page.url, page.rank);
            self.stats.record_ranked();
            self.results().push(page);
            self.rank_queue.task_done();
        }

        tracing::debug!("Rank worker {} finished", worker_id);
    }

    /// Number of pages ranked so far
    pub fn ranked_count(&self) -> usize {
        self.results().len()
    }

    /// Takes the ranked pages, leaving the result set empty
    pub fn take_results(&self) -> Vec<Page> {
        std::mem::take(&mut *self.results())
    }

    fn results(&self) -> std::sync::MutexGuard<'_, Vec<Page>> {
        self.ranked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
