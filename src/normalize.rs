//! URL normalisation and site-query derivation.
//!
//! Canonicalises URLs so that equivalent pages (differing only in
//! scheme, a leading `www.`, a trailing slash, query parameters, or
//! fragments) compare as equal, and derives the literal `site:` query
//! submitted to the provider.

use url::Url;

/// Normalise a URL for indexation equality comparison.
///
/// Applies the following transformations:
///
/// 1. Drop the scheme, query, and fragment.
/// 2. Lowercase the host and strip a leading `www.` (path casing is
///    preserved — only host casing is insignificant).
/// 3. Strip the trailing slash from the path.
///
/// Two URLs refer to the same page iff their normalised forms are
/// equal. Deterministic and side-effect free. Input that cannot be
/// parsed even with an assumed `https://` scheme is returned trimmed
/// but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use indexcheck::normalize::normalize;
///
/// assert_eq!(
///     normalize("https://www.Example.com/Foo/"),
///     normalize("http://example.com/Foo"),
/// );
/// ```
pub fn normalize(raw: &str) -> String {
    match host_and_path(raw) {
        Some((host, path)) if path.is_empty() => host,
        Some((host, path)) => format!("{host}/{path}"),
        None => raw.trim().to_string(),
    }
}

/// Derive the `site:` search query for a URL.
///
/// Produces `site:<host>` for a root URL and `site:<host>/<path>` for a
/// URL with a non-empty path, with the host stripped of `www.` and the
/// path stripped of leading/trailing slashes. A path of `/` or the
/// empty string collapses to the bare `site:<host>` form.
///
/// # Examples
///
/// ```
/// use indexcheck::normalize::site_query;
///
/// assert_eq!(site_query("https://www.example.com/"), "site:example.com");
/// assert_eq!(
///     site_query("https://example.com/blog/post/"),
///     "site:example.com/blog/post",
/// );
/// ```
pub fn site_query(raw: &str) -> String {
    match host_and_path(raw) {
        Some((host, path)) if path.is_empty() => format!("site:{host}"),
        Some((host, path)) => format!("site:{host}/{path}"),
        None => format!("site:{}", raw.trim()),
    }
}

/// Split a URL into (host without `www.`, path without outer slashes).
///
/// Scheme-less input like `example.com/page` is accepted by retrying the
/// parse with an assumed `https://` prefix.
fn host_and_path(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok())?;

    // Url::parse already lowercases the host.
    let host = parsed.host_str()?.trim_start_matches("www.").to_string();
    let path = parsed.path().trim_matches('/').to_string();
    Some((host, path))
}
