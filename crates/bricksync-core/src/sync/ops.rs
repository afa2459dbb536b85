//! The three write operations a reconciliation applies.

use std::fmt;

use async_trait::async_trait;
use bricksync_types::{BulkOutcome, ListId, PlannedUpdate, RemoteRecord, WriteItem, WriteOutcome};
use tracing::warn;

use super::executor::BatchOp;
use crate::remote::RemoteListAdapter;

pub struct AddOp<'a, A> {
    adapter: &'a A,
}

impl<'a, A> AddOp<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<'a, A: RemoteListAdapter> BatchOp for AddOp<'a, A> {
    type Item = WriteItem<A::Key>;

    fn label(&self) -> &'static str {
        "add"
    }

    async fn submit_bulk(&self, list: &ListId, items: &[Self::Item]) -> Option<BulkOutcome> {
        Some(self.adapter.write_bulk(list, items).await)
    }

    async fn submit_one(&self, list: &ListId, item: &Self::Item) -> WriteOutcome {
        self.adapter.write_one(list, item).await
    }
}

/// Removals are issued one at a time; the remote has no bulk delete.
pub struct RemoveOp<'a, A> {
    adapter: &'a A,
}

impl<'a, A> RemoveOp<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<'a, A: RemoteListAdapter> BatchOp for RemoveOp<'a, A> {
    type Item = RemoteRecord<A::Key>;

    fn label(&self) -> &'static str {
        "remove"
    }

    async fn submit_one(&self, list: &ListId, item: &Self::Item) -> WriteOutcome {
        self.adapter.delete_one(list, item).await
    }
}

/// A quantity update with the identifier its re-add must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceItem<K> {
    pub update: PlannedUpdate<K>,
    pub resolved_id: Option<String>,
}

impl<K: Clone> ReplaceItem<K> {
    fn replacement(&self) -> WriteItem<K> {
        WriteItem {
            key: self.update.key.clone(),
            quantity: self.update.new_quantity,
            resolved_id: self.resolved_id.clone(),
        }
    }
}

impl<K: fmt::Display> fmt::Display for ReplaceItem<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.update, f)
    }
}

/// Updates are a delete followed by an add at the new quantity.
///
/// When the delete lands but the add does not, the entry is gone from the
/// remote until the next run re-adds it; that case is reported, never
/// counted as a success.
pub struct ReplaceOp<'a, A> {
    adapter: &'a A,
}

impl<'a, A> ReplaceOp<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<'a, A: RemoteListAdapter> BatchOp for ReplaceOp<'a, A> {
    type Item = ReplaceItem<A::Key>;

    fn label(&self) -> &'static str {
        "update"
    }

    async fn submit_one(&self, list: &ListId, item: &Self::Item) -> WriteOutcome {
        match self.adapter.delete_one(list, &item.update.current()).await {
            WriteOutcome::Applied => {},
            WriteOutcome::RateLimited => return WriteOutcome::RateLimited,
            WriteOutcome::Failed(reason) => {
                return WriteOutcome::Failed(format!("removing old entry failed: {}", reason));
            },
        }

        match self.adapter.write_one(list, &item.replacement()).await {
            WriteOutcome::Applied => WriteOutcome::Applied,
            WriteOutcome::RateLimited => {
                warn!(item = %item, "Old entry removed but re-add was rate limited");
                WriteOutcome::RateLimited
            },
            WriteOutcome::Failed(reason) => WriteOutcome::Failed(format!(
                "old entry removed but re-add at x{} failed: {}",
                item.update.new_quantity, reason
            )),
        }
    }
}
