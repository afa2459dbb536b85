//! Translation of natural keys into the identifiers a remote list writes with.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bricksync_types::{ListKey, PartColor, SetNum, WriteItem};
use tracing::{debug, info, warn};

/// Items ready to write, and the keys that had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<K> {
    pub resolved: Vec<WriteItem<K>>,
    pub unresolved: Vec<K>,
    /// Remote lookups issued while resolving
    pub lookups: usize,
}

impl<K> Default for Resolution<K> {
    fn default() -> Self {
        Self { resolved: Vec::new(), unresolved: Vec::new(), lookups: 0 }
    }
}

#[async_trait]
pub trait KeyResolver<K: ListKey>: Send + Sync {
    async fn resolve(
        &self,
        items: Vec<WriteItem<K>>,
        origins: &BTreeMap<K, SetNum>,
    ) -> Resolution<K>;
}

/// For lists keyed by the natural key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

#[async_trait]
impl<K: ListKey> KeyResolver<K> for IdentityResolver {
    async fn resolve(
        &self,
        items: Vec<WriteItem<K>>,
        _origins: &BTreeMap<K, SetNum>,
    ) -> Resolution<K> {
        Resolution { resolved: items, unresolved: Vec::new(), lookups: 0 }
    }
}

/// Result of fetching one set's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryLookup {
    /// `(part, color) -> inventory part id` rows
    Found(Vec<(PartColor, String)>),
    RateLimited,
    Failed(String),
}

#[async_trait]
pub trait SetInventorySource: Send + Sync {
    async fn set_inventory(&self, set: &SetNum) -> InventoryLookup;
}

/// Resolves inventory part ids by looking each item up in the inventory of
/// the set it is missing from.
///
/// Items are grouped by origin set so every set is fetched once. Items
/// without an origin, without a match, or behind a failed fetch are
/// unresolved. A rate-limited fetch ends the lookups for this run.
#[derive(Debug)]
pub struct InventoryKeyResolver<S> {
    source: Arc<S>,
}

impl<S> InventoryKeyResolver<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: SetInventorySource> KeyResolver<PartColor> for InventoryKeyResolver<S> {
    async fn resolve(
        &self,
        items: Vec<WriteItem<PartColor>>,
        origins: &BTreeMap<PartColor, SetNum>,
    ) -> Resolution<PartColor> {
        let mut resolution = Resolution::default();
        let mut by_set: BTreeMap<SetNum, Vec<WriteItem<PartColor>>> = BTreeMap::new();

        for item in items {
            if item.resolved_id.is_some() {
                resolution.resolved.push(item);
                continue;
            }
            match origins.get(&item.key) {
                Some(set) => by_set.entry(set.clone()).or_default().push(item),
                None => {
                    debug!(key = %item.key, "No origin set, cannot resolve inventory id");
                    resolution.unresolved.push(item.key);
                },
            }
        }

        let mut throttled = false;
        for (set, group) in by_set {
            if throttled {
                resolution.unresolved.extend(group.into_iter().map(|item| item.key));
                continue;
            }

            resolution.lookups += 1;
            match self.source.set_inventory(&set).await {
                InventoryLookup::Found(rows) => {
                    let mut table: HashMap<PartColor, String> = HashMap::with_capacity(rows.len());
                    for (key, id) in rows {
                        table.entry(key).or_insert(id);
                    }
                    for mut item in group {
                        match table.get(&item.key) {
                            Some(id) => {
                                item.resolved_id = Some(id.clone());
                                resolution.resolved.push(item);
                            },
                            None => {
                                debug!(key = %item.key, set = %set, "Part not in set inventory");
                                resolution.unresolved.push(item.key);
                            },
                        }
                    }
                },
                InventoryLookup::RateLimited => {
                    warn!(set = %set, "Rate limited while fetching set inventory, stopping lookups");
                    throttled = true;
                    resolution.unresolved.extend(group.into_iter().map(|item| item.key));
                },
                InventoryLookup::Failed(reason) => {
                    warn!(set = %set, error = %reason, "Failed to fetch set inventory");
                    resolution.unresolved.extend(group.into_iter().map(|item| item.key));
                },
            }
        }

        resolution.resolved.sort_by(|a, b| a.key.cmp(&b.key));
        resolution.unresolved.sort();
        if !resolution.unresolved.is_empty() {
            info!(
                resolved = resolution.resolved.len(),
                unresolved = resolution.unresolved.len(),
                lookups = resolution.lookups,
                "Some items could not be matched to an inventory part"
            );
        }
        resolution
    }
}
