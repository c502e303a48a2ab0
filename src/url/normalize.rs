use crate::UrlError;
use url::form_urlencoded;
use url::Url;

/// Suffix appended to every plain-text export file name
const EXPORT_SUFFIX: &str = ".txt";

/// Returns true if the string starts with an `http://` or `https://` scheme
///
/// The check is case-insensitive, matching how browsers treat schemes.
pub fn has_http_scheme(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parses an absolute HTTP(S) URL
///
/// # Errors
///
/// * `UrlError::Parse` - the string is not a valid absolute URL
/// * `UrlError::InvalidScheme` - the scheme is not http or https
/// * `UrlError::MissingDomain` - the URL has no host
///
/// # Examples
///
/// ```
/// use site_ranker::url::parse_http_url;
///
/// let url = parse_http_url("https://example.com/page").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Encodes a URL into a file name that can be decoded back to the URL
///
/// Uses `application/x-www-form-urlencoded` byte serialization, so `/`, `:`
/// and `?` never reach the file system unescaped.
///
/// # Examples
///
/// ```
/// use site_ranker::url::{file_name_to_url, url_to_file_name};
///
/// let name = url_to_file_name("http://example.com/a b?x=1");
/// assert_eq!(name, "http%3A%2F%2Fexample.com%2Fa+b%3Fx%3D1.txt");
/// assert_eq!(file_name_to_url(&name).as_deref(), Some("http://example.com/a b?x=1"));
/// ```
pub fn url_to_file_name(url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("{}{}", encoded, EXPORT_SUFFIX)
}

/// Decodes a file name produced by [`url_to_file_name`] back into its URL
///
/// Returns None if the name does not carry the export suffix.
pub fn file_name_to_url(file_name: &str) -> Option<String> {
    let encoded = file_name.strip_suffix(EXPORT_SUFFIX)?;
    // form_urlencoded::parse splits on '&' and '='; both are escaped by
    // byte_serialize, so the whole name decodes as a single key.
    let decoded: String = form_urlencoded::parse(encoded.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect();
    Some(decoded)
}
