//! URL helper functions for the rezka backend
//!
//! Provides functions for building probe, catalog, search, stream and
//! detail URLs relative to a resolved mirror origin.

use url::Url;

use crate::types::{Category, StreamRequest};

/// Strips trailing slashes from a mirror origin
///
/// # Example
/// ```
/// use rezka_core::url::normalize_base;
/// assert_eq!(normalize_base("https://hdrezka.ag/"), "https://hdrezka.ag");
/// ```
pub fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Builds the URL a mirror is probed at (`HEAD <origin>/`)
///
/// # Example
/// ```
/// use rezka_core::url::build_probe_url;
/// assert_eq!(build_probe_url("https://hdrezka.ag"), "https://hdrezka.ag/");
/// ```
pub fn build_probe_url(base: &str) -> String {
    format!("{}/", base.trim_end_matches('/'))
}

/// Builds the search URL for a given query
///
/// URL encodes the query and appends the fixed `do`/`subaction` parameters.
///
/// # Example
/// ```
/// use rezka_core::url::build_search_url;
/// let url = build_search_url("https://hdrezka.ag", "die hard");
/// assert_eq!(url, "https://hdrezka.ag/search?do=search&subaction=search&q=die%20hard");
/// ```
pub fn build_search_url(base: &str, query: &str) -> String {
    format!(
        "{}/search?do=search&subaction=search&q={}",
        base.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Builds the URL of a fixed catalog listing
///
/// # Example
/// ```
/// use rezka_core::Category;
/// use rezka_core::url::build_category_url;
/// assert_eq!(
///     build_category_url("https://hdrezka.ag", Category::NowWatching),
///     "https://hdrezka.ag/watching/"
/// );
/// ```
pub fn build_category_url(base: &str, category: Category) -> String {
    format!("{}{}", base.trim_end_matches('/'), category.path())
}

/// Builds the stream metadata URL for a request
///
/// Only the parameters present on the request are appended.
pub fn build_stream_url(base: &str, request: &StreamRequest) -> String {
    let mut url = format!(
        "{}/movie/stream?url={}",
        base.trim_end_matches('/'),
        urlencoding::encode(&request.url)
    );

    let optional = [
        ("translation", &request.translation),
        ("quality", &request.quality),
        ("season", &request.season),
        ("episode", &request.episode),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
    }

    url
}

/// Returns true if `link` is an absolute http(s) URL
pub fn is_absolute_http(link: &str) -> bool {
    Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Resolves a backend-supplied detail link
///
/// Absolute http(s) links are returned untouched. Relative links are
/// joined onto `base`.
///
/// # Example
/// ```
/// use rezka_core::url::resolve_detail_url;
/// assert_eq!(
///     resolve_detail_url("https://hdrezka.ag", "/films/1-die-hard.html"),
///     "https://hdrezka.ag/films/1-die-hard.html"
/// );
/// assert_eq!(
///     resolve_detail_url("https://hdrezka.ag", "//cdn.example/m/1"),
///     "https://cdn.example/m/1"
/// );
/// assert_eq!(
///     resolve_detail_url("https://hdrezka.ag", "https://other.example/m/1"),
///     "https://other.example/m/1"
/// );
/// ```
pub fn resolve_detail_url(base: &str, link: &str) -> String {
    if is_absolute_http(link) {
        return link.to_string();
    }

    let base = base.trim_end_matches('/');
    match Url::parse(&format!("{}/", base)).and_then(|root| root.join(link)) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::debug!("Cannot join {:?} onto {}: {}", link, base, e);
            if link.starts_with('/') {
                format!("{}{}", base, link)
            } else {
                format!("{}/{}", base, link)
            }
        }
    }
}
