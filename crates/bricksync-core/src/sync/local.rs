//! Normalises raw local records into a per-key snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use bricksync_types::{ListKey, LocalRecord, LocalSnapshot, PartColor, SetNum, SyncError};
use tracing::debug;

use crate::store::LocalStore;

/// Produces the local side of a diff for one domain.
pub trait LocalStateReader<K: ListKey>: Send + Sync {
    fn read(&self) -> Result<LocalSnapshot<K>, SyncError>;
}

/// Sum quantities per key, drop non-positive totals and remember the first
/// origin set seen for each key.
pub fn normalize<K: ListKey>(records: Vec<LocalRecord<K>>) -> LocalSnapshot<K> {
    let source_records = records.len();
    let mut totals: BTreeMap<K, i64> = BTreeMap::new();
    let mut origins: BTreeMap<K, SetNum> = BTreeMap::new();

    for record in records {
        if record.quantity <= 0 {
            continue;
        }
        *totals.entry(record.key.clone()).or_insert(0) += record.quantity;
        if let Some(origin) = record.origin_set {
            origins.entry(record.key).or_insert(origin);
        }
    }

    let quantities: BTreeMap<K, u32> = totals
        .into_iter()
        .filter(|(_, total)| *total > 0)
        .map(|(key, total)| (key, u32::try_from(total).unwrap_or(u32::MAX)))
        .collect();
    origins.retain(|key, _| quantities.contains_key(key));

    LocalSnapshot { quantities, origins, source_records }
}

#[derive(Clone)]
pub struct OwnedSetsReader {
    store: Arc<dyn LocalStore>,
}

impl OwnedSetsReader {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }
}

impl LocalStateReader<SetNum> for OwnedSetsReader {
    fn read(&self) -> Result<LocalSnapshot<SetNum>, SyncError> {
        let snapshot = normalize(self.store.owned_sets()?);
        debug!(
            records = snapshot.source_records,
            unique = snapshot.len(),
            "Local owned sets loaded"
        );
        Ok(snapshot)
    }
}

#[derive(Clone)]
pub struct MissingPartsReader {
    store: Arc<dyn LocalStore>,
    include_spare: bool,
}

impl MissingPartsReader {
    pub fn new(store: Arc<dyn LocalStore>, include_spare: bool) -> Self {
        Self { store, include_spare }
    }
}

impl LocalStateReader<PartColor> for MissingPartsReader {
    fn read(&self) -> Result<LocalSnapshot<PartColor>, SyncError> {
        let snapshot = normalize(self.store.missing_parts(self.include_spare)?);
        debug!(
            records = snapshot.source_records,
            unique = snapshot.len(),
            include_spare = self.include_spare,
            "Local missing parts loaded"
        );
        Ok(snapshot)
    }
}
