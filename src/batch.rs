//! Partitioning of check requests into submission batches.
//!
//! Order within a batch is significant: it is the only correlation
//! mechanism between submitted query position and returned task id, so
//! the input order is preserved end-to-end.

use crate::types::CheckRequest;

/// Split `requests` into batches of at most `batch_size`, preserving
/// input order. All batches have length `batch_size` except possibly
/// the last. Pure, no I/O.
///
/// `batch_size` is validated as ≥ 1 by
/// [`CheckConfig::validate`](crate::config::CheckConfig::validate); a
/// zero passed here directly yields no batches rather than panicking.
pub fn make_batches(requests: Vec<CheckRequest>, batch_size: usize) -> Vec<Vec<CheckRequest>> {
    if batch_size == 0 || requests.is_empty() {
        return Vec::new();
    }

    let mut batches = Vec::with_capacity(requests.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size.min(requests.len()));

    for request in requests {
        current.push(request);
        if current.len() == batch_size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
