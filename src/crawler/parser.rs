//! HTML parser for extracting out-links
//!
//! Only `<a href>` anchors count as out-links. Each link is resolved against
//! the page URL, stripped of its fragment, and reported once.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the distinct absolute out-links of an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, relative or absolute
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:`, `data:` links
/// - Fragment-only links (same-page anchors)
/// - Anything that does not resolve to http or https
///
/// Links are returned in document order of first appearance.
///
/// # Example
///
/// ```
/// use site_ranker::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page">Link</a><a href="/page#top">Again</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://other.com/page"]
        );
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<a href="/other">Link</a>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/other"]
        );
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<a href="sibling">Link</a>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/dir/sibling"]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS upper</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>x</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        "#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<a href="#section">Jump</a>"##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_fragment_stripped_and_deduplicated() {
        let html = r#"
            <a href="/a#one">One</a>
            <a href="/a#two">Two</a>
            <a href="/a">Plain</a>
        "#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/a"]
        );
    }

    #[test]
    fn test_ignores_non_anchor_resources() {
        let html = r#"
            <link rel="stylesheet" href="/style.css">
            <script src="/app.js"></script>
            <img src="/logo.png">
            <a>No href</a>
        "#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"
            <a href="/page1">1</a>
            <a href="https://other.com/page3">3</a>
            <a href="/page2">2</a>
        "#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec![
                "https://example.com/page1",
                "https://other.com/page3",
                "https://example.com/page2",
            ]
        );
    }
}
