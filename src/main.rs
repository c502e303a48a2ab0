//! Site-Ranker main entry point
//!
//! This is the command-line interface for the Site-Ranker crawler.

use anyhow::Context;
use clap::Parser;
use site_ranker::config::{load_config_with_hash, validate, Config};
use site_ranker::crawler::run_crawl;
use site_ranker::output::{print_report, print_statistics, write_markdown_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Ranker: a resumable, depth-bounded site crawler
///
/// Site-Ranker crawls a site breadth-first from a root URL, snapshots every
/// page to disk so an interrupted run can resume, and ranks each page by the
/// share of its links that stay on its own domain.
#[derive(Parser, Debug)]
#[command(name = "site-ranker")]
#[command(version)]
#[command(about = "A resumable site crawler that ranks pages by link locality", long_about = None)]
struct Cli {
    /// Root URL to crawl; a bare host is tried over https, then http
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum crawl depth (the root is depth 0)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Seconds a crawl worker waits on an empty queue before reporting idleness
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of crawl workers
    #[arg(long, value_name = "N")]
    crawl_workers: Option<usize>,

    /// Number of rank workers
    #[arg(long, value_name = "N")]
    rank_workers: Option<usize>,

    /// Directory holding per-run snapshot folders
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Also write the ranked report as markdown to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Discard snapshots from a previous run instead of resuming it
    #[arg(long)]
    fresh: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    let mut report = run_crawl(&cli.url, &config, cli.fresh)
        .await
        .with_context(|| format!("crawl of {} failed", cli.url))?;
    if let Some(hash) = config_hash {
        report = report.with_config_hash(hash);
    }

    if !cli.quiet {
        print_report(&report);
        println!();
        print_statistics(&report.stats);
    }

    if let Some(path) = &config.output.report_path {
        write_markdown_report(&report, path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.idle_timeout_secs = timeout;
    }
    if let Some(n) = cli.crawl_workers {
        config.crawler.crawl_workers = n;
    }
    if let Some(n) = cli.rank_workers {
        config.crawler.rank_workers = n;
    }
    if let Some(dir) = &cli.data_dir {
        config.output.data_dir = dir.clone();
    }
    if let Some(path) = &cli.report {
        config.output.report_path = Some(path.clone());
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_ranker=info,warn"),
            1 => EnvFilter::new("site_ranker=debug,info"),
            2 => EnvFilter::new("site_ranker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
