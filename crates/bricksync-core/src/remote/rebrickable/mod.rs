//! Rebrickable v3 endpoints.
//!
//! [`RebrickableApi`] owns credentials, paging and list discovery; the three
//! list adapters and the set-inventory lookup are thin translations on top.

mod api;
mod inventory;
mod lost_parts;
mod partlist;
mod setlist;
mod wire;


pub use api::{PagedRead, RebrickableApi, MAX_PAGES, PAGE_SIZE};
pub use lost_parts::{LostPartsAdapter, LOST_PARTS_LIST};
pub use partlist::PartListAdapter;
pub use setlist::SetListAdapter;

use bricksync_types::{BulkOutcome, SyncError, WriteOutcome};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;

use crate::remote::caller::{CallError, RemoteResponse};

/// Everything outside the RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode one path segment.
pub(crate) fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

pub(crate) fn write_outcome(result: Result<RemoteResponse, CallError>) -> WriteOutcome {
    match result {
        Ok(response) if response.is_rate_limited() => WriteOutcome::RateLimited,
        Ok(response) if response.is_success() => WriteOutcome::Applied,
        Ok(response) => WriteOutcome::Failed(response.to_error().to_string()),
        Err(e) => WriteOutcome::Failed(SyncError::from(e).to_string()),
    }
}

/// Like [`write_outcome`], but an entry that is already gone is fine.
pub(crate) fn delete_outcome(result: Result<RemoteResponse, CallError>) -> WriteOutcome {
    match result {
        Ok(response) if response.status == StatusCode::NOT_FOUND => WriteOutcome::Applied,
        other => write_outcome(other),
    }
}

/// Map a bulk POST response. An array echo tells how many entries the
/// remote actually stored; any other success body is taken as all of them.
pub(crate) fn bulk_outcome(
    result: Result<RemoteResponse, CallError>,
    submitted: usize,
) -> BulkOutcome {
    match result {
        Ok(response) if response.is_success() => {
            let count = match serde_json::from_slice::<serde_json::Value>(&response.body) {
                Ok(serde_json::Value::Array(entries)) => entries.len().min(submitted),
                _ => submitted,
            };
            BulkOutcome::Accepted { count }
        },
        Ok(response) => BulkOutcome::Rejected {
            rate_limited: response.is_rate_limited(),
            reason: response.to_error().to_string(),
        },
        Err(e) => BulkOutcome::Rejected { rate_limited: false, reason: SyncError::from(e).to_string() },
    }
}
