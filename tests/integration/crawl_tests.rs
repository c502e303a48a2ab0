//! Integration tests for the crawler
//!
//! Most tests drive the full crawl and rank cycle through a scripted
//! `LinkFetcher`; the last one uses wiremock to exercise the real HTTP
//! fetcher end-to-end.

use async_trait::async_trait;
use site_ranker::config::{CrawlerConfig, HttpConfig};
use site_ranker::crawler::{Coordinator, FetchError, HttpFetcher, LinkFetcher};
use site_ranker::state::Page;
use site_ranker::storage::{FileStorage, Storage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT: &str = "http://example.com/";

/// Serves a fixed link graph and records every fetch
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, Vec<String>>,
    not_html: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    fn not_html(mut self, url: &str) -> Self {
        self.not_html.push(url.to_string());
        self
    }

    fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn max_calls_per_url(&self) -> usize {
        self.calls.lock().unwrap().values().copied().max().unwrap_or(0)
    }
}

#[async_trait]
impl LinkFetcher for ScriptedFetcher {
    async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        match self.delays.get(url) {
            Some(delay) => tokio::time::sleep(*delay).await,
            // Give other workers a chance to interleave
            None => tokio::task::yield_now().await,
        }

        if self.not_html.iter().any(|u| u == url) {
            return Err(FetchError::ContentTypeMismatch {
                content_type: "application/pdf".to_string(),
            });
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::Http { status: 404 })
    }
}

fn crawler_config(max_depth: u32) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        idle_timeout_secs: 1,
        crawl_workers: 4,
        rank_workers: 2,
    }
}

async fn crawl(
    dir: &TempDir,
    root: &str,
    max_depth: u32,
    fetcher: Arc<ScriptedFetcher>,
) -> site_ranker::output::CrawlReport {
    let storage = Arc::new(FileStorage::open(dir.path(), root).unwrap());
    let coordinator = Coordinator::with_storage(root, crawler_config(max_depth), storage, fetcher);
    tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("crawl should terminate")
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_one_crawl_ranks_root_and_children() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(ROOT, &["http://example.com/a", "http://other.com/b"])
            .page("http://example.com/a", &["http://example.com/deep"])
            .page("http://other.com/b", &["http://other.com/deeper"]),
    );

    let report = crawl(&dir, ROOT, 1, Arc::clone(&fetcher)).await;

    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.page(ROOT).unwrap().rank, 0.5);
    assert_eq!(report.page("http://example.com/a").unwrap().rank, 1.0);
    assert_eq!(report.page("http://other.com/b").unwrap().rank, 1.0);

    // Links found at the depth limit are recorded but never followed
    assert_eq!(fetcher.calls("http://example.com/deep"), 0);
    assert_eq!(fetcher.calls("http://other.com/deeper"), 0);
    assert_eq!(fetcher.total_calls(), 3);

    assert_eq!(report.stats.fetched, 3);
    assert_eq!(report.stats.ranked, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fetch_slower_than_idle_timeout_still_crawls_children() {
    let dir = TempDir::new().unwrap();
    // Idle timeout is 1s; every other worker sits idle while the root loads
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(ROOT, &["http://example.com/a", "http://example.com/b"])
            .slow(ROOT, Duration::from_millis(1500))
            .page("http://example.com/a", &["http://other.com/"])
            .page("http://example.com/b", &[]),
    );

    let report = crawl(&dir, ROOT, 1, Arc::clone(&fetcher)).await;

    assert_eq!(fetcher.calls("http://example.com/a"), 1);
    assert_eq!(fetcher.calls("http://example.com/b"), 1);
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.page("http://example.com/a").unwrap().rank, 0.0);
    assert_eq!(report.page(ROOT).unwrap().rank, 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_non_html_page_seen_but_not_ranked_or_exported() {
    let dir = TempDir::new().unwrap();
    let pdf = "http://example.com/paper.pdf";
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(ROOT, &[pdf, "http://example.com/a"])
            .page("http://example.com/a", &[])
            .not_html(pdf),
    );

    let report = crawl(&dir, ROOT, 2, Arc::clone(&fetcher)).await;

    assert!(report.page(pdf).is_none());
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.stats.rejected, 1);

    let storage = FileStorage::open(dir.path(), ROOT).unwrap();
    assert!(!storage.export_path(pdf).exists());
    assert!(storage.export_path(ROOT).exists());

    let rejected: Vec<Page> = storage
        .load_pages()
        .unwrap()
        .filter(|p| p.url == pdf)
        .collect();
    assert_eq!(rejected.len(), 1);
    assert!(!rejected[0].valid_mime);
    assert!(rejected[0].out_links.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_densely_linked_site_fetches_each_url_once() {
    let dir = TempDir::new().unwrap();
    let urls: Vec<String> = (0..15)
        .map(|i| format!("http://example.com/p{}", i))
        .collect();
    let all: Vec<&str> = urls.iter().map(String::as_str).chain([ROOT]).collect();

    let mut fetcher = ScriptedFetcher::new().page(ROOT, &all);
    for url in &urls {
        fetcher = fetcher.page(url, &all);
    }
    let fetcher = Arc::new(fetcher);

    let report = crawl(&dir, ROOT, 3, Arc::clone(&fetcher)).await;

    assert_eq!(fetcher.max_calls_per_url(), 1);
    assert_eq!(fetcher.total_calls(), 16);
    assert_eq!(report.pages.len(), 16);
    assert!(report.pages.iter().all(|p| p.rank == 1.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_limit_bounds_the_crawl() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(ROOT, &["http://example.com/1"])
            .page("http://example.com/1", &["http://example.com/2"])
            .page("http://example.com/2", &["http://example.com/3"])
            .page("http://example.com/3", &["http://example.com/4"]),
    );

    let report = crawl(&dir, ROOT, 2, Arc::clone(&fetcher)).await;

    let mut depths: Vec<(String, u32)> = report
        .pages
        .iter()
        .map(|p| (p.url.clone(), p.depth))
        .collect();
    depths.sort();
    assert_eq!(
        depths,
        vec![
            (ROOT.to_string(), 0),
            ("http://example.com/1".to_string(), 1),
            ("http://example.com/2".to_string(), 2),
        ]
    );
    assert_eq!(fetcher.calls("http://example.com/3"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restart_resumes_from_unexplored_links() {
    let dir = TempDir::new().unwrap();
    {
        let storage = FileStorage::open(dir.path(), ROOT).unwrap();
        storage
            .save_page(&Page::new(ROOT, ROOT, vec!["http://example.com/a".into(), "http://example.com/b".into()], 0))
            .unwrap();
        storage
            .save_page(&Page::new(ROOT, "http://example.com/a", vec!["http://example.com/c".into()], 1))
            .unwrap();
        storage
            .save_page(&Page::new(ROOT, "http://example.com/b", vec!["http://other.com/".into()], 1))
            .unwrap();
        storage
            .save_page(&Page::rejected(ROOT, "http://example.com/file.zip", 1))
            .unwrap();
    }

    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(ROOT, &["http://example.com/a", "http://example.com/b"])
            .page("http://example.com/c", &[])
            .page("http://other.com/", &[]),
    );

    let report = crawl(&dir, ROOT, 2, Arc::clone(&fetcher)).await;

    // Recovered pages are never fetched again; the root is
    assert_eq!(fetcher.calls("http://example.com/a"), 0);
    assert_eq!(fetcher.calls("http://example.com/b"), 0);
    assert_eq!(fetcher.calls("http://example.com/file.zip"), 0);
    assert_eq!(fetcher.calls(ROOT), 1);
    assert_eq!(fetcher.calls("http://example.com/c"), 1);
    assert_eq!(fetcher.calls("http://other.com/"), 1);

    assert_eq!(report.stats.recovered, 4);
    assert_eq!(report.pages.len(), 5);
    assert_eq!(report.page("http://example.com/b").unwrap().rank, 0.0);
    assert!(report.page("http://example.com/file.zip").is_none());

    // New snapshots were appended after the recovered ones
    let storage = FileStorage::open(dir.path(), ROOT).unwrap();
    assert_eq!(storage.load_pages().unwrap().count(), 7);
    for id in 0..7 {
        assert!(storage.snapshot_path(id).exists());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_http_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><body>
                    <a href="/page1">Page 1</a>
                    <a href="/doc.pdf">Paper</a>
                    </body></html>"#,
                    "text/html; charset=utf-8",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><body>
                    <a href="/">Home</a>
                    <a href="http://other.example/x">Elsewhere</a>
                    </body></html>"#,
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::open(dir.path(), &root).unwrap());
    let fetcher = Arc::new(HttpFetcher::from_config(&HttpConfig::default()).unwrap());
    let coordinator = Coordinator::with_storage(&root, crawler_config(1), storage.clone(), fetcher);

    let report = tokio::time::timeout(Duration::from_secs(20), coordinator.run())
        .await
        .expect("crawl should terminate")
        .unwrap();

    let page1 = format!("{}page1", root);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.page(&root).unwrap().rank, 1.0);
    assert_eq!(report.page(&page1).unwrap().rank, 0.5);
    assert_eq!(report.stats.rejected, 1);

    let export = std::fs::read_to_string(storage.export_path(&page1)).unwrap();
    assert_eq!(
        export.lines().collect::<Vec<_>>(),
        vec![root.as_str(), "http://other.example/x"]
    );
}
