//! The diff plan and the items submitted to the remote.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::RemoteRecord;

/// Quantity change for a key present on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUpdate<K> {
    pub key: K,
    pub old_quantity: u32,
    pub new_quantity: u32,
    pub remote_id: Option<String>,
}

impl<K: Clone> PlannedUpdate<K> {
    /// The remote entry this update replaces.
    pub fn current(&self) -> RemoteRecord<K> {
        RemoteRecord {
            key: self.key.clone(),
            quantity: self.old_quantity,
            remote_id: self.remote_id.clone(),
        }
    }
}

/// Something to add to the remote list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteItem<K> {
    pub key: K,
    pub quantity: u32,
    /// Remote identifier the write must be expressed in, when the list is not
    /// keyed by the natural key. Filled by a key resolver.
    pub resolved_id: Option<String>,
}

impl<K> WriteItem<K> {
    pub fn new(key: K, quantity: u32) -> Self {
        Self { key, quantity, resolved_id: None }
    }
}

impl<K: fmt::Display> fmt::Display for WriteItem<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.key, self.quantity)
    }
}

impl<K: fmt::Display> fmt::Display for PlannedUpdate<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} -> x{}", self.key, self.old_quantity, self.new_quantity)
    }
}

/// Partition of the key space into adds, removes and updates.
///
/// The three partitions are disjoint and each is ordered by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPlan<K: Ord> {
    pub to_add: BTreeMap<K, u32>,
    pub to_remove: Vec<RemoteRecord<K>>,
    pub to_update: Vec<PlannedUpdate<K>>,
}

impl<K: Ord> DiffPlan<K> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.to_update.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len() + self.to_update.len()
    }

    /// True when no key is both added and touched on the remote, and no
    /// remote entry is addressed by both an update and a removal.
    ///
    /// A key may appear in both updates and removals when the remote holds
    /// duplicate entries for it, as long as the removal names a different
    /// remote id.
    pub fn check_disjoint(&self) -> bool {
        let removes_clear = self.to_remove.iter().all(|r| !self.to_add.contains_key(&r.key));
        let updates_clear = self.to_update.iter().all(|u| {
            !self.to_add.contains_key(&u.key)
                && !self.to_remove.iter().any(|r| {
                    r.key == u.key && (r.remote_id.is_none() || r.remote_id == u.remote_id)
                })
        });
        removes_clear && updates_clear
    }
}

impl<K: Ord> Default for DiffPlan<K> {
    fn default() -> Self {
        Self { to_add: BTreeMap::new(), to_remove: Vec::new(), to_update: Vec::new() }
    }
}
