use bricksync_types::{LocalRecord, PartColor, SetNum, SyncError};
use parking_lot::RwLock;

use super::LocalStore;

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<Vec<LocalRecord<SetNum>>>,
    /// Missing parts with their spare flag
    parts: RwLock<Vec<(LocalRecord<PartColor>, bool)>>,
    fail_reads: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sets<I, S>(sets: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let store = Self::new();
        store.replace_sets(sets);
        store
    }

    pub fn replace_sets<I, S>(&self, sets: I)
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        *self.sets.write() = sets
            .into_iter()
            .map(|(set_num, quantity)| LocalRecord::new(SetNum::new(set_num), quantity))
            .collect();
    }

    pub fn push_missing(&self, record: LocalRecord<PartColor>, is_spare: bool) {
        self.parts.write().push((record, is_spare));
    }

    pub fn clear_missing(&self) {
        self.parts.write().clear();
    }

    /// Make every read fail with `reason`, or clear the failure with `None`.
    pub fn fail_reads(&self, reason: Option<&str>) {
        *self.fail_reads.write() = reason.map(str::to_string);
    }

    fn check(&self) -> Result<(), SyncError> {
        match self.fail_reads.read().as_ref() {
            Some(reason) => Err(SyncError::LocalStore { message: reason.clone() }),
            None => Ok(()),
        }
    }
}

impl LocalStore for MemoryStore {
    fn owned_sets(&self) -> Result<Vec<LocalRecord<SetNum>>, SyncError> {
        self.check()?;
        Ok(self.sets.read().clone())
    }

    fn missing_parts(&self, include_spare: bool) -> Result<Vec<LocalRecord<PartColor>>, SyncError> {
        self.check()?;
        Ok(self
            .parts
            .read()
            .iter()
            .filter(|(_, is_spare)| include_spare || !is_spare)
            .map(|(record, _)| record.clone())
            .collect())
    }
}
