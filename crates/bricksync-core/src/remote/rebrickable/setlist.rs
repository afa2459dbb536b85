use std::sync::Arc;

use async_trait::async_trait;
use bricksync_types::{
    BulkOutcome, ListId, RemoteRecord, RemoteSnapshot, SetNum, SyncError, WriteItem, WriteOutcome,
};
use serde_json::json;

use super::api::RebrickableApi;
use super::wire::{SetListEntry, SetWrite};
use super::{bulk_outcome, delete_outcome, segment, write_outcome};
use crate::remote::adapter::RemoteListAdapter;
use crate::remote::caller::RemoteRequest;

/// A user set list, keyed by set number.
#[derive(Debug, Clone)]
pub struct SetListAdapter {
    api: Arc<RebrickableApi>,
}

impl SetListAdapter {
    pub fn new(api: Arc<RebrickableApi>) -> Self {
        Self { api }
    }

    fn sets_path(&self, list: &ListId) -> String {
        self.api.user_path(&format!("setlists/{}/sets/", segment(list.as_str())))
    }
}

#[async_trait]
impl RemoteListAdapter for SetListAdapter {
    type Key = SetNum;

    async fn ensure_list(&self, name: &str) -> Result<(ListId, bool), SyncError> {
        let body = json!({ "name": name, "is_buildable": true });
        self.api.find_or_create_list("setlists", name, body).await
    }

    async fn read_all(&self, list: &ListId) -> RemoteSnapshot<SetNum> {
        let read = self.api.read_pages::<SetListEntry>(&self.sets_path(list)).await;
        let records = read
            .items
            .into_iter()
            .map(|entry| RemoteRecord::new(SetNum(entry.set.set_num), entry.quantity))
            .collect();
        match read.failure {
            None => RemoteSnapshot::complete(records, read.pages),
            Some(failure) => RemoteSnapshot::partial(records, read.pages, failure),
        }
    }

    async fn write_bulk(&self, list: &ListId, items: &[WriteItem<SetNum>]) -> BulkOutcome {
        let payload: Vec<SetWrite<'_>> = items
            .iter()
            .map(|item| SetWrite { set_num: item.key.as_str(), quantity: item.quantity })
            .collect();
        let request = RemoteRequest::post(self.sets_path(list), json!(payload));
        bulk_outcome(self.api.send_bulk(request).await, items.len())
    }

    async fn write_one(&self, list: &ListId, item: &WriteItem<SetNum>) -> WriteOutcome {
        let payload = SetWrite { set_num: item.key.as_str(), quantity: item.quantity };
        let request = RemoteRequest::post(self.sets_path(list), json!(payload));
        write_outcome(self.api.send(request).await)
    }

    async fn delete_one(&self, list: &ListId, record: &RemoteRecord<SetNum>) -> WriteOutcome {
        let path = format!("{}{}/", self.sets_path(list), segment(record.key.as_str()));
        delete_outcome(self.api.send(RemoteRequest::delete(path)).await)
    }
}
