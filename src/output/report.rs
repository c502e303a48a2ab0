//! Ranked report generation
//!
//! The report lists every ranked page, highest rank first, together with the
//! run metadata and end-of-run statistics.

use crate::output::stats::CrawlStatistics;
use crate::state::Page;
use crate::url::registrable_domain;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Number of linked domains listed in the markdown report
const TOP_DOMAINS: usize = 10;

/// Result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub root_url: String,
    pub depth_limit: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub stats: CrawlStatistics,
    /// Ranked pages, highest rank first, ties broken by URL
    pub pages: Vec<Page>,
}

impl CrawlReport {
    /// Builds a report, sorting `pages` into report order
    pub fn new(
        root_url: impl Into<String>,
        depth_limit: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        stats: CrawlStatistics,
        mut pages: Vec<Page>,
    ) -> Self {
        pages.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.url.cmp(&b.url))
        });

        Self {
            root_url: root_url.into(),
            depth_limit,
            started_at,
            finished_at,
            config_hash: None,
            stats,
            pages,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Looks up a ranked page by URL
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.url == url)
    }

    /// Mean rank over all ranked pages
    pub fn average_rank(&self) -> f64 {
        if self.pages.is_empty() {
            return 0.0;
        }
        self.pages.iter().map(|p| p.rank).sum::<f64>() / self.pages.len() as f64
    }

    /// Counts out-links per registrable domain, most linked first
    pub fn linked_domains(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for link in self.pages.iter().flat_map(|p| &p.out_links) {
            if let Some(domain) = registrable_domain(link) {
                *counts.entry(domain).or_insert(0) += 1;
            }
        }

        let mut domains: Vec<_> = counts.into_iter().collect();
        domains.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        domains
    }
}

/// Formats the ranked pages as a plain-text table: `url  depth  rank`
pub fn format_report_table(report: &CrawlReport) -> String {
    let width = report
        .pages
        .iter()
        .map(|p| p.url.len())
        .max()
        .unwrap_or(3)
        .max(3);

    let mut out = String::new();
    out.push_str(&format!("{:<width$}  {:>5}  {:>5}\n", "URL", "DEPTH", "RANK"));
    for page in &report.pages {
        out.push_str(&format!(
            "{:<width$}  {:>5}  {:>5.2}\n",
            page.url, page.depth, page.rank
        ));
    }
    out
}

/// Prints the ranked pages to stdout
pub fn print_report(report: &CrawlReport) {
    println!(
        "=== Ranks for {} (depth {}) ===\n",
        report.root_url, report.depth_limit
    );
    print!("{}", format_report_table(report));
    println!(
        "\n{} pages ranked in {}s",
        report.pages.len(),
        report.duration_seconds()
    );
}

/// Writes the report as markdown to `output_path`
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Site-Ranker Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root URL**: {}\n", report.root_url));
    md.push_str(&format!("- **Depth Limit**: {}\n", report.depth_limit));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    let stats = &report.stats;
    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.fetched));
    md.push_str(&format!("- **Rejected (not HTML)**: {}\n", stats.rejected));
    md.push_str(&format!("- **Failed**: {}\n", stats.failed));
    md.push_str(&format!("- **Recovered Snapshots**: {}\n", stats.recovered));
    md.push_str(&format!("- **Pages Ranked**: {}\n", report.pages.len()));
    md.push_str(&format!(
        "- **Average Rank**: {:.2}\n",
        report.average_rank()
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    md.push_str("## Ranked Pages\n\n");
    if report.pages.is_empty() {
        md.push_str("_No pages were ranked._\n\n");
    } else {
        md.push_str("| URL | Depth | Rank | Out-links |\n");
        md.push_str("|-----|------:|-----:|----------:|\n");
        for page in &report.pages {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {} |\n",
                page.url,
                page.depth,
                page.rank,
                page.out_links.len()
            ));
        }
        md.push('\n');
    }

    let domains = report.linked_domains();
    if !domains.is_empty() {
        md.push_str("## Most Linked Domains\n\n");
        for (domain, count) in domains.iter().take(TOP_DOMAINS) {
            md.push_str(&format!("- {} ({} links)\n", domain, count));
        }
        md.push('\n');
    }

    md
}
