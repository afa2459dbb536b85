//! Domain models shared by the sync engine and the daemon.

mod config;
mod domain;
mod key;
mod outcome;
mod plan;
mod record;
mod report;

pub use config::{DomainSettings, RemoteConfig, RetryConfig, SyncConfig, ThrottleConfig};
pub use domain::Domain;
pub use key::{ListId, ListKey, PartColor, SetNum};
pub use outcome::{BulkOutcome, ExecutionResult, WriteOutcome};
pub use plan::{DiffPlan, PlannedUpdate, WriteItem};
pub use record::{LocalRecord, LocalSnapshot, RemoteRecord, RemoteSnapshot};
pub use report::{SyncOutcome, SyncReport};
