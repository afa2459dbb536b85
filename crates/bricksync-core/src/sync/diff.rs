//! Pure diff between local quantities and the remote list.

use std::collections::BTreeMap;

use bricksync_types::{DiffPlan, ListKey, PlannedUpdate, RemoteRecord};
use tracing::warn;

/// Remote records indexed by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIndex<K: Ord> {
    /// First entry seen per key; the one updates are applied to.
    pub entries: BTreeMap<K, RemoteRecord<K>>,
    /// Further entries for an already indexed key that carry their own
    /// remote id. They are always removed so one entry per key remains.
    pub duplicates: Vec<RemoteRecord<K>>,
}

impl<K: Ord> RemoteIndex<K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&RemoteRecord<K>> {
        self.entries.get(key)
    }
}

/// Index remote records by key.
///
/// Duplicates addressed by their own remote id are kept for removal.
/// Duplicates without one are dropped: deleting by key clears them all.
pub fn remote_map<K: ListKey>(records: Vec<RemoteRecord<K>>) -> RemoteIndex<K> {
    let mut entries: BTreeMap<K, RemoteRecord<K>> = BTreeMap::new();
    let mut duplicates = Vec::new();
    for record in records {
        if let Some(existing) = entries.get(&record.key) {
            let removable = record.remote_id.is_some() && record.remote_id != existing.remote_id;
            warn!(
                key = %record.key,
                kept = ?existing.remote_id,
                duplicate = ?record.remote_id,
                removable,
                "Duplicate remote entry for key"
            );
            if removable {
                duplicates.push(record);
            }
            continue;
        }
        entries.insert(record.key.clone(), record);
    }
    duplicates.sort_by(|a, b| a.key.cmp(&b.key));
    RemoteIndex { entries, duplicates }
}

/// Partition keys into adds, removes and quantity updates.
///
/// Keys with equal quantities on both sides produce nothing. Duplicate
/// remote entries always land in the removals. Every partition is ordered
/// by key.
pub fn diff<K: ListKey>(local: &BTreeMap<K, u32>, remote: &RemoteIndex<K>) -> DiffPlan<K> {
    let mut plan = DiffPlan::default();

    for (key, &quantity) in local {
        match remote.get(key) {
            None => {
                plan.to_add.insert(key.clone(), quantity);
            },
            Some(existing) if existing.quantity != quantity => {
                plan.to_update.push(PlannedUpdate {
                    key: key.clone(),
                    old_quantity: existing.quantity,
                    new_quantity: quantity,
                    remote_id: existing.remote_id.clone(),
                });
            },
            Some(_) => {},
        }
    }

    plan.to_remove = remote
        .entries
        .iter()
        .filter(|(key, _)| !local.contains_key(*key))
        .map(|(_, record)| record.clone())
        .chain(remote.duplicates.iter().cloned())
        .collect();
    plan.to_remove.sort_by(|a, b| a.key.cmp(&b.key));

    plan
}
