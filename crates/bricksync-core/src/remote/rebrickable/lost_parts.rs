use std::sync::Arc;

use async_trait::async_trait;
use bricksync_types::{
    BulkOutcome, ListId, PartColor, RemoteRecord, RemoteSnapshot, SyncError, WriteItem,
    WriteOutcome,
};
use serde_json::json;
use tracing::debug;

use super::api::RebrickableApi;
use super::wire::{LostPartEntry, LostPartWrite};
use super::{bulk_outcome, delete_outcome, segment, write_outcome};
use crate::remote::adapter::RemoteListAdapter;
use crate::remote::caller::RemoteRequest;

/// Pseudo list id: every user has exactly one lost-parts collection.
pub const LOST_PARTS_LIST: &str = "lost_parts";

/// The user's lost-parts collection.
///
/// Reads are keyed by part and color, but writes must name an inventory
/// part id, so items need a `resolved_id` from the inventory resolver.
/// Deletes go by the remote `lost_part_id`.
#[derive(Debug, Clone)]
pub struct LostPartsAdapter {
    api: Arc<RebrickableApi>,
}

impl LostPartsAdapter {
    pub fn new(api: Arc<RebrickableApi>) -> Self {
        Self { api }
    }

    fn collection_path(&self) -> String {
        self.api.user_path("lost_parts/")
    }

    fn payload(item: &WriteItem<PartColor>) -> Option<LostPartWrite> {
        let id = item.resolved_id.as_deref()?;
        // Inventory ids are numeric on the wire
        let inv_part_id = match id.parse::<u64>() {
            Ok(numeric) => json!(numeric),
            Err(_) => json!(id),
        };
        Some(LostPartWrite { inv_part_id, lost_quantity: item.quantity })
    }
}

#[async_trait]
impl RemoteListAdapter for LostPartsAdapter {
    type Key = PartColor;

    async fn ensure_list(&self, _name: &str) -> Result<(ListId, bool), SyncError> {
        Ok((ListId::new(LOST_PARTS_LIST), false))
    }

    async fn read_all(&self, _list: &ListId) -> RemoteSnapshot<PartColor> {
        let read = self.api.read_pages::<LostPartEntry>(&self.collection_path()).await;
        let records = read
            .items
            .into_iter()
            .map(|entry| {
                RemoteRecord::with_id(
                    PartColor::new(entry.inv_part.part.part_num, entry.inv_part.color.id),
                    entry.lost_quantity,
                    entry.lost_part_id.to_string(),
                )
            })
            .collect();
        match read.failure {
            None => RemoteSnapshot::complete(records, read.pages),
            Some(failure) => RemoteSnapshot::partial(records, read.pages, failure),
        }
    }

    async fn write_bulk(&self, _list: &ListId, items: &[WriteItem<PartColor>]) -> BulkOutcome {
        let payload: Vec<LostPartWrite> = items.iter().filter_map(Self::payload).collect();
        if payload.is_empty() {
            return BulkOutcome::Rejected {
                rate_limited: false,
                reason: "no items carry an inventory part id".to_string(),
            };
        }
        if payload.len() < items.len() {
            debug!(
                submitted = payload.len(),
                skipped = items.len() - payload.len(),
                "Skipping lost parts without inventory part id"
            );
        }
        let request = RemoteRequest::post(self.collection_path(), json!(payload));
        bulk_outcome(self.api.send_bulk(request).await, payload.len())
    }

    async fn write_one(&self, _list: &ListId, item: &WriteItem<PartColor>) -> WriteOutcome {
        let Some(payload) = Self::payload(item) else {
            return WriteOutcome::Failed(format!("no inventory part id for {}", item.key));
        };
        let request = RemoteRequest::post(self.collection_path(), json!([payload]));
        write_outcome(self.api.send(request).await)
    }

    async fn delete_one(&self, _list: &ListId, record: &RemoteRecord<PartColor>) -> WriteOutcome {
        let Some(lost_part_id) = record.remote_id.as_deref() else {
            return WriteOutcome::Failed(format!("no lost_part_id for {}", record.key));
        };
        let path = self.api.user_path(&format!("lost_parts/{}/", segment(lost_part_id)));
        delete_outcome(self.api.send(RemoteRequest::delete(path)).await)
    }
}
