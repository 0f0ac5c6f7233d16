//! Indexation matcher: decides whether a completed task's results
//! contain the checked URL.
//!
//! Only organic items count; ads, rich snippets, and other special
//! blocks are ignored even when their URL matches. Matching is exact
//! normalized equality — no substring or prefix matching.

use crate::api::ResultItem;
use crate::normalize::normalize;

/// Returns `true` iff any organic result item's URL normalizes to the
/// same form as `original_url`.
pub fn is_indexed(original_url: &str, items: &[ResultItem]) -> bool {
    let target = normalize(original_url);
    items
        .iter()
        .filter(|item| item.is_organic())
        .filter_map(|item| item.url.as_deref())
        .any(|url| normalize(url) == target)
}
