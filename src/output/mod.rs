//! Output module for crawl results
//!
//! This module handles:
//! - Live crawl counters and their end-of-run snapshot
//! - The ranked report, printed to stdout or written as markdown

mod report;
pub mod stats;

pub use report::{
    format_markdown_report, format_report_table, print_report, write_markdown_report,
    CrawlReport, OutputError, OutputResult,
};
pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
