//! Configuration module for Site-Ranker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can also run from command-line flags alone.
//!
//! # Example
//!
//! ```no_run
//! use site_ranker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-ranker.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
