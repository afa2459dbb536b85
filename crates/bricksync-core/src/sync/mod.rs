//! Reconciliation: local snapshot, diff, key resolution, batched writes.

pub mod diff;
pub mod engine;
pub mod executor;
pub mod local;
pub mod ops;
pub mod reconciler;
pub mod resolver;

pub use diff::{diff, remote_map, RemoteIndex};
pub use engine::SyncEngine;
pub use executor::{BatchExecutor, BatchOp};
pub use local::{LocalStateReader, MissingPartsReader, OwnedSetsReader};
pub use reconciler::{Phase, PhaseOrder, Reconciler};
pub use resolver::{IdentityResolver, InventoryKeyResolver, KeyResolver, Resolution};
