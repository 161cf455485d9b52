//! File extension and host helpers.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Extension assumed when a URL has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

static URL_SUFFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\.(\w*)$").ok());

fn url_suffix(url: &str) -> Option<&str> {
    URL_SUFFIX
        .as_ref()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extension for the existence check made before fetching.
pub fn guess_extension(url: &str) -> &str {
    url_suffix(url).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_EXTENSION)
}

/// Extension for a fetched image: declared content type first, then the URL suffix.
pub fn file_extension(content_type: Option<&str>, url: &str) -> Option<String> {
    let mapped = content_type.and_then(|ct| match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    });
    mapped
        .or_else(|| url_suffix(url).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Host part of a URL, used to key circuit breakers.
pub fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority.rsplit('@').next().unwrap_or_default().to_ascii_lowercase()
}
