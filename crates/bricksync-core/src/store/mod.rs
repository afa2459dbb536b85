//! Local inventory access.
//!
//! The engine only reads local state. Stores return raw records; summing,
//! dropping non-positive quantities and origin tracking happen in
//! [`crate::sync::local`].

mod memory;
mod sqlite;


pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use bricksync_types::{LocalRecord, PartColor, SetNum, SyncError};

pub trait LocalStore: Send + Sync {
    /// One record per owned copy of a set (or pre-aggregated counts).
    fn owned_sets(&self) -> Result<Vec<LocalRecord<SetNum>>, SyncError>;

    /// Parts still missing from owned sets and their minifigures.
    fn missing_parts(&self, include_spare: bool) -> Result<Vec<LocalRecord<PartColor>>, SyncError>;
}
