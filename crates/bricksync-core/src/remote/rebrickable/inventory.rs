use async_trait::async_trait;
use bricksync_types::{PartColor, SetNum};

use super::api::RebrickableApi;
use super::segment;
use super::wire::SetInventoryEntry;
use crate::sync::resolver::{InventoryLookup, SetInventorySource};

/// Large enough to cover all but a handful of sets in one request.
const INVENTORY_PAGE_SIZE: u32 = 1000;

#[async_trait]
impl SetInventorySource for RebrickableApi {
    async fn set_inventory(&self, set: &SetNum) -> InventoryLookup {
        let path = format!("lego/sets/{}/parts/", segment(set.as_str()));
        let read =
            self.read_pages_sized::<SetInventoryEntry>(&path, INVENTORY_PAGE_SIZE, true).await;

        // A truncated inventory would mark real parts as missing from the set
        if read.rate_limited {
            return InventoryLookup::RateLimited;
        }
        if let Some(failure) = read.failure {
            return InventoryLookup::Failed(failure);
        }

        InventoryLookup::Found(
            read.items
                .into_iter()
                .map(|entry| {
                    (PartColor::new(entry.part.part_num, entry.color.id), entry.id.to_string())
                })
                .collect(),
        )
    }
}
