//! The seam between the generic reconciler and a concrete remote list.

use async_trait::async_trait;
use bricksync_types::{
    BulkOutcome, ListId, ListKey, RemoteRecord, RemoteSnapshot, SyncError, WriteItem, WriteOutcome,
};

/// A remote collection keyed by a natural key.
///
/// Implementations translate between the engine's records and one remote
/// endpoint family. None of the methods raise for remote-side failures:
/// rate limiting and rejections come back as outcome values.
#[async_trait]
pub trait RemoteListAdapter: Send + Sync {
    type Key: ListKey;

    /// Find the list by name, creating it when absent.
    ///
    /// Returns the list id and whether it was created by this call.
    async fn ensure_list(&self, name: &str) -> Result<(ListId, bool), SyncError>;

    /// Page through the whole list.
    async fn read_all(&self, list: &ListId) -> RemoteSnapshot<Self::Key>;

    /// Submit several items in one request.
    async fn write_bulk(&self, list: &ListId, items: &[WriteItem<Self::Key>]) -> BulkOutcome;

    async fn write_one(&self, list: &ListId, item: &WriteItem<Self::Key>) -> WriteOutcome;

    /// Remove an entry. An entry that is already gone counts as applied.
    async fn delete_one(&self, list: &ListId, record: &RemoteRecord<Self::Key>) -> WriteOutcome;
}
