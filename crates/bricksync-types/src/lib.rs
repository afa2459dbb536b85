//! # Bricksync Types
//!
//! Core types, models, and error definitions for Bricksync.
//!
//! This crate provides the foundational type system shared by the sync engine
//! and the daemon:
//!
//! - **`error`** - Typed error hierarchy for sync runs and configuration
//! - **`models`** - Keys, records, diff plans, execution results, reports and config
//!
//! ## Architecture Role
//!
//! ```text
//!            bricksync-types (this crate)
//!                     │
//!                     ▼
//!              bricksync-core
//!                     │
//!                     ▼
//!             bricksync-server
//! ```
//!
//! Nothing in here performs I/O. All types are serializable via serde so that
//! reports and config can be persisted and printed as JSON.

pub mod error;
pub mod models;

pub use error::{ConfigError, Result, SyncError};

pub use models::{
    BulkOutcome, DiffPlan, Domain, DomainSettings, ExecutionResult, ListId, ListKey,
    LocalRecord, LocalSnapshot, PartColor, PlannedUpdate, RemoteConfig, RemoteRecord,
    RemoteSnapshot, RetryConfig, SetNum, SyncConfig, SyncOutcome, SyncReport, ThrottleConfig,
    WriteItem, WriteOutcome,
};
