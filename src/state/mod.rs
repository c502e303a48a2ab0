//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Page`: the record of one crawled resource, persisted as a snapshot
//! - `CrawlState`: the `seen` and `processed` sets shared by every worker

mod crawl_state;
mod page;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page::Page;
