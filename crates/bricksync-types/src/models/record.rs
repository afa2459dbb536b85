//! Local and remote views of a collection.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::SetNum;

/// One raw row from the local store, before normalisation.
///
/// Quantity is signed because the store may compute it (needed minus owned)
/// and produce zero or negative values; those never reach the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord<K> {
    pub key: K,
    pub quantity: i64,
    /// Set the item belongs to, when known. Needed to resolve inventory ids.
    pub origin_set: Option<SetNum>,
}

impl<K> LocalRecord<K> {
    pub fn new(key: K, quantity: i64) -> Self {
        Self { key, quantity, origin_set: None }
    }

    pub fn from_set(key: K, quantity: i64, origin_set: SetNum) -> Self {
        Self { key, quantity, origin_set: Some(origin_set) }
    }
}

/// Normalised local state: one positive quantity per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSnapshot<K: Ord> {
    pub quantities: BTreeMap<K, u32>,
    /// First origin set seen per key.
    pub origins: BTreeMap<K, SetNum>,
    /// Number of raw records the snapshot was built from.
    pub source_records: usize,
}

impl<K: Ord> LocalSnapshot<K> {
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl<K: Ord> Default for LocalSnapshot<K> {
    fn default() -> Self {
        Self { quantities: BTreeMap::new(), origins: BTreeMap::new(), source_records: 0 }
    }
}

/// An entry as it currently exists on the remote list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord<K> {
    pub key: K,
    pub quantity: u32,
    /// Remote-assigned id, for lists whose delete endpoint needs it.
    pub remote_id: Option<String>,
}

impl<K> RemoteRecord<K> {
    pub fn new(key: K, quantity: u32) -> Self {
        Self { key, quantity, remote_id: None }
    }

    pub fn with_id(key: K, quantity: u32, remote_id: impl Into<String>) -> Self {
        Self { key, quantity, remote_id: Some(remote_id.into()) }
    }
}

impl<K: fmt::Display> fmt::Display for RemoteRecord<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote_id {
            Some(id) => write!(f, "{} (#{})", self.key, id),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Result of paging through a remote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot<K> {
    pub records: Vec<RemoteRecord<K>>,
    /// Pages successfully read.
    pub pages: u32,
    /// False when paging stopped on an error before the last page.
    pub complete: bool,
    pub failure: Option<String>,
}

impl<K> RemoteSnapshot<K> {
    pub fn complete(records: Vec<RemoteRecord<K>>, pages: u32) -> Self {
        Self { records, pages, complete: true, failure: None }
    }

    pub fn partial(records: Vec<RemoteRecord<K>>, pages: u32, failure: impl Into<String>) -> Self {
        Self { records, pages, complete: false, failure: Some(failure.into()) }
    }

    /// Nothing could be read at all; the run must not write.
    pub fn is_failed(&self) -> bool {
        !self.complete && self.pages == 0
    }
}
