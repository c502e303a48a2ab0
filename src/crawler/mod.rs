//! Crawler module for page fetching, ranking and coordination
//!
//! This module contains the core crawling logic, including:
//! - The shared work queue both worker pools consume
//! - HTTP fetching and HTML link extraction
//! - Crawl workers that expand the site breadth-first
//! - Rank workers that score pages by link locality
//! - Overall crawl coordination and restart recovery

mod coordinator;
mod fetcher;
mod parser;
mod queue;
mod ranker;
mod spider;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, resolve_root_url, FetchError, HttpFetcher, LinkFetcher};
pub use parser::extract_links;
pub use queue::{Pop, WorkQueue};
pub use ranker::{compute_rank, rank_page, Ranker};
pub use spider::{CrawlTask, Spider};

use crate::config::{validate, Config};
use crate::output::CrawlReport;
use crate::CrawlerError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client from the configuration
/// 3. Resolve the root URL, preferring https
/// 4. Open run storage and recover any previous session
/// 5. Crawl and rank until the site is exhausted to the depth limit
///
/// # Arguments
///
/// * `root` - The root URL, with or without a scheme
/// * `config` - The crawler configuration
/// * `fresh` - Discard snapshots of a previous run first
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CrawlerError)` - Invalid configuration, unreachable root, or storage failure
pub async fn run_crawl(root: &str, config: &Config, fresh: bool) -> Result<CrawlReport, CrawlerError> {
    validate(config)?;
    let client = build_http_client(&config.http)?;
    let root_url = resolve_root_url(&client, root).await?;

    let fetcher = Arc::new(HttpFetcher::new(client));
    let coordinator = Coordinator::new(root_url.as_str(), config, fetcher, fresh)?;
    coordinator.run().await
}
