use url::Url;

/// Extracts the domain (including any subdomain) from a URL string
///
/// This is the host portion of the URL, lowercased. Ports are not part of
/// the domain. Returns None for unparseable URLs and URLs without a host.
///
/// # Examples
///
/// ```
/// use site_ranker::url::extract_domain;
///
/// assert_eq!(extract_domain("https://Blog.Example.com/post"), Some("blog.example.com".to_string()));
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}

/// Extracts the registrable domain (last two host labels) from a URL string
///
/// `https://blog.example.com/` yields `example.com`. Hosts with a single
/// label are returned unchanged.
///
/// # Examples
///
/// ```
/// use site_ranker::url::registrable_domain;
///
/// assert_eq!(registrable_domain("https://a.b.example.com/"), Some("example.com".to_string()));
/// ```
pub fn registrable_domain(url: &str) -> Option<String> {
    let host = extract_domain(url)?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Some(host);
    }
    Some(labels[labels.len() - 2..].join("."))
}

/// Returns true if both URLs share the same host, ignoring the port
///
/// Two URLs without a parseable host compare equal, which mirrors how the
/// ranker treats links it cannot attribute to any site.
pub fn same_domain(a: &str, b: &str) -> bool {
    extract_domain(a) == extract_domain(b)
}
