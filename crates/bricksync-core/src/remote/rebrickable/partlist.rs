use std::sync::Arc;

use async_trait::async_trait;
use bricksync_types::{
    BulkOutcome, ListId, PartColor, RemoteRecord, RemoteSnapshot, SyncError, WriteItem,
    WriteOutcome,
};
use serde_json::json;

use super::api::RebrickableApi;
use super::wire::{PartListEntry, PartWrite};
use super::{bulk_outcome, delete_outcome, segment, write_outcome};
use crate::remote::adapter::RemoteListAdapter;
use crate::remote::caller::RemoteRequest;

/// A named user part list, keyed by part and color.
#[derive(Debug, Clone)]
pub struct PartListAdapter {
    api: Arc<RebrickableApi>,
}

impl PartListAdapter {
    pub fn new(api: Arc<RebrickableApi>) -> Self {
        Self { api }
    }

    fn parts_path(&self, list: &ListId) -> String {
        self.api.user_path(&format!("partlists/{}/parts/", segment(list.as_str())))
    }

    fn payload(item: &WriteItem<PartColor>) -> PartWrite<'_> {
        PartWrite {
            part_num: &item.key.part_num,
            color_id: item.key.color_id,
            quantity: item.quantity,
        }
    }
}

#[async_trait]
impl RemoteListAdapter for PartListAdapter {
    type Key = PartColor;

    async fn ensure_list(&self, name: &str) -> Result<(ListId, bool), SyncError> {
        let body = json!({ "name": name, "is_buildable": false, "num_parts": 0 });
        self.api.find_or_create_list("partlists", name, body).await
    }

    async fn read_all(&self, list: &ListId) -> RemoteSnapshot<PartColor> {
        let read = self.api.read_pages::<PartListEntry>(&self.parts_path(list)).await;
        let records = read
            .items
            .into_iter()
            .map(|entry| {
                RemoteRecord::new(PartColor::new(entry.part.part_num, entry.color.id), entry.quantity)
            })
            .collect();
        match read.failure {
            None => RemoteSnapshot::complete(records, read.pages),
            Some(failure) => RemoteSnapshot::partial(records, read.pages, failure),
        }
    }

    async fn write_bulk(&self, list: &ListId, items: &[WriteItem<PartColor>]) -> BulkOutcome {
        let payload: Vec<PartWrite<'_>> = items.iter().map(Self::payload).collect();
        let request = RemoteRequest::post(self.parts_path(list), json!(payload));
        bulk_outcome(self.api.send_bulk(request).await, items.len())
    }

    async fn write_one(&self, list: &ListId, item: &WriteItem<PartColor>) -> WriteOutcome {
        let request = RemoteRequest::post(self.parts_path(list), json!(Self::payload(item)));
        write_outcome(self.api.send(request).await)
    }

    async fn delete_one(&self, list: &ListId, record: &RemoteRecord<PartColor>) -> WriteOutcome {
        let path = format!(
            "{}{}/{}/",
            self.parts_path(list),
            segment(&record.key.part_num),
            record.key.color_id
        );
        delete_outcome(self.api.send(RemoteRequest::delete(path)).await)
    }
}
