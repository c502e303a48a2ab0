//! Page record definitions
//!
//! A `Page` is created by a crawl worker right after a fetch attempt, persisted
//! as a snapshot, and later given a rank by exactly one rank worker.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One crawled resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Root URL of the crawl run that produced this page
    pub root_url: String,

    /// Absolute URL of this page
    pub url: String,

    /// Absolute URLs discovered on this page
    #[serde(default)]
    pub out_links: Vec<String>,

    /// Distance from the root (root is 0)
    pub depth: u32,

    /// Same-domain link locality score in [0, 1]
    #[serde(default)]
    pub rank: f64,

    /// False when the resource was fetched but was not HTML
    #[serde(default = "default_valid_mime")]
    pub valid_mime: bool,
}

fn default_valid_mime() -> bool {
    true
}

impl Page {
    /// Creates a page for a successfully fetched HTML resource
    pub fn new(
        root_url: impl Into<String>,
        url: impl Into<String>,
        out_links: Vec<String>,
        depth: u32,
    ) -> Self {
        Self {
            root_url: root_url.into(),
            url: url.into(),
            out_links,
            depth,
            rank: 0.0,
            valid_mime: true,
        }
    }

    /// Creates a page for a resource rejected because it is not HTML
    ///
    /// Rejected pages never carry out-links.
    pub fn rejected(root_url: impl Into<String>, url: impl Into<String>, depth: u32) -> Self {
        Self {
            root_url: root_url.into(),
            url: url.into(),
            out_links: Vec::new(),
            depth,
            rank: 0.0,
            valid_mime: false,
        }
    }

    /// Drops out-links from a rejected page
    ///
    /// Snapshots are plain files and may have been edited by hand; a page
    /// that was not HTML never carries links once loaded.
    pub fn without_rejected_links(mut self) -> Self {
        if !self.valid_mime {
            self.out_links.clear();
        }
        self
    }

    /// Returns true if this page's links may be followed from `depth_limit`
    pub fn can_expand(&self, depth_limit: u32) -> bool {
        self.valid_mime && self.depth < depth_limit
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  {:.2}", self.url, self.depth, self.rank)
    }
}
