//! URL handling module for Site-Ranker
//!
//! This module provides domain extraction, root URL parsing, and the
//! reversible URL-to-file-name encoding used by the plain-text export.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, registrable_domain, same_domain};
pub use normalize::{file_name_to_url, has_http_scheme, parse_http_url, url_to_file_name};
