use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default maximum crawl depth (root is depth 0)
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Default idle timeout for crawl workers waiting on an empty queue
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Default size of the crawl worker pool
pub const DEFAULT_CRAWL_WORKERS: usize = 12;

/// Default size of the rank worker pool
pub const DEFAULT_RANK_WORKERS: usize = 3;

/// Main configuration structure for Site-Ranker
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the root URL
    pub max_depth: u32,

    /// Seconds a crawl worker waits on an empty queue before reporting idleness
    pub idle_timeout_secs: u64,

    /// Number of concurrent crawl workers
    pub crawl_workers: usize,

    /// Number of concurrent rank workers
    pub rank_workers: usize,
}

impl CrawlerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            crawl_workers: DEFAULT_CRAWL_WORKERS,
            rank_workers: DEFAULT_RANK_WORKERS,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Total request timeout (seconds)
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("site-ranker/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory under which each run gets its own folder
    pub data_dir: PathBuf,

    /// Optional path for a markdown rank report
    pub report_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            report_path: None,
        }
    }
}
