//! Chunked batch execution with per-item fallback.
//!
//! Items are submitted in chunks. A chunk is first tried as one bulk request;
//! if that is refused, the chunk's items are retried one by one. As soon as
//! any item in a chunk is rate limited, every later chunk is deferred
//! without being attempted, so a throttled remote is not hammered further.


use async_trait::async_trait;
use bricksync_types::{BulkOutcome, ExecutionResult, ListId, WriteOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// One kind of remote write, applied to items of type `Item`.
#[async_trait]
pub trait BatchOp: Send + Sync {
    type Item: Send + Sync + std::fmt::Display;

    /// Short name for logs and error strings, e.g. `add`.
    fn label(&self) -> &'static str;

    /// Submit a whole chunk. `None` means the op has no bulk primitive and
    /// items go straight to [`BatchOp::submit_one`].
    async fn submit_bulk(&self, _list: &ListId, _items: &[Self::Item]) -> Option<BulkOutcome> {
        None
    }

    async fn submit_one(&self, list: &ListId, item: &Self::Item) -> WriteOutcome;
}

#[derive(Debug, Clone)]
pub struct BatchExecutor {
    batch_size: usize,
    cancel: CancellationToken,
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchExecutor {
    pub fn new(batch_size: usize) -> Self {
        Self::with_cancel(batch_size, CancellationToken::new())
    }

    pub fn with_cancel(batch_size: usize, cancel: CancellationToken) -> Self {
        Self { batch_size: batch_size.max(1), cancel }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn execute<O: BatchOp>(
        &self,
        list: &ListId,
        items: &[O::Item],
        op: &O,
    ) -> ExecutionResult {
        let mut result = ExecutionResult::new(items.len());
        if items.is_empty() {
            return result;
        }

        let label = op.label();
        let total_chunks = items.len().div_ceil(self.batch_size);
        let mut chunks = items.chunks(self.batch_size).enumerate();

        while let Some((index, chunk)) = chunks.next() {
            let chunk_no = index + 1;
            if self.cancel.is_cancelled() {
                let remaining = chunk.len() + chunks.map(|(_, rest)| rest.len()).sum::<usize>();
                warn!(op = label, remaining, "Cancelled, deferring remaining items");
                result.defer(remaining);
                break;
            }

            debug!(op = label, chunk = chunk_no, total_chunks, size = chunk.len(), "Processing chunk");

            let hit_rate_limit = match op.submit_bulk(list, chunk).await {
                Some(BulkOutcome::Accepted { count }) => {
                    let accepted = count.min(chunk.len());
                    result.succeeded += accepted;
                    // Items the remote did not acknowledge are counted as failures
                    for item in &chunk[accepted..] {
                        result.errors.push(format!("{} {}: not acknowledged by remote", label, item));
                    }
                    info!(op = label, chunk = chunk_no, accepted, "Bulk request accepted");
                    false
                },
                Some(BulkOutcome::Rejected { rate_limited, reason }) => {
                    warn!(
                        op = label,
                        chunk = chunk_no,
                        rate_limited,
                        error = %reason,
                        "Bulk request refused, falling back to individual requests"
                    );
                    self.run_individually(list, chunk, op, &mut result).await
                },
                None => self.run_individually(list, chunk, op, &mut result).await,
            };

            if hit_rate_limit {
                let remaining: usize = chunks.map(|(_, rest)| rest.len()).sum();
                if remaining > 0 {
                    warn!(
                        op = label,
                        chunk = chunk_no,
                        remaining,
                        "Stopping early, deferring remaining items to the next run"
                    );
                    result.defer(remaining);
                }
                break;
            }
        }

        debug_assert!(result.is_conserved());
        result
    }

    /// Apply each item on its own. Returns true when any item was rate limited.
    async fn run_individually<O: BatchOp>(
        &self,
        list: &ListId,
        chunk: &[O::Item],
        op: &O,
        result: &mut ExecutionResult,
    ) -> bool {
        let label = op.label();
        let mut hit_rate_limit = false;

        for (position, item) in chunk.iter().enumerate() {
            if self.cancel.is_cancelled() {
                result.defer(chunk.len() - position);
                return true;
            }
            match op.submit_one(list, item).await {
                WriteOutcome::Applied => {
                    result.succeeded += 1;
                    debug!(op = label, item = %item, "Applied");
                },
                WriteOutcome::RateLimited => {
                    result.rate_limited += 1;
                    hit_rate_limit = true;
                    debug!(op = label, item = %item, "Rate limited");
                },
                WriteOutcome::Failed(reason) => {
                    warn!(op = label, item = %item, error = %reason, "Item failed");
                    result.errors.push(format!("{} {}: {}", label, item, reason));
                },
            }
        }

        hit_rate_limit
    }
}
