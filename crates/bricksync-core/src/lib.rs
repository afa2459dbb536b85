//! # Bricksync Core
//!
//! Keeps remote collection lists on Rebrickable in step with a local
//! inventory database.
//!
//! ## Architecture
//!
//! ```text
//! bricksync-core/src/
//! ├── remote/
//! │   ├── rate_limit/   # shared throttle state machine
//! │   ├── caller/       # retrying HTTP caller with backoff
//! │   ├── adapter.rs    # RemoteListAdapter seam
//! │   └── rebrickable/  # set list, lost parts, part list, set inventory
//! ├── store/            # local inventory (SQLite, in-memory)
//! ├── sync/
//! │   ├── local.rs      # local state normalisation
//! │   ├── diff.rs       # pure diff engine
//! │   ├── resolver.rs   # natural key -> remote id resolution
//! │   ├── executor/     # chunked bulk writes with per-item fallback
//! │   ├── reconciler/   # one generic run: read, diff, apply, report
//! │   └── engine.rs     # per-domain wiring and mutual exclusion
//! └── modules/          # config persistence, data dir
//! ```
//!
//! A run never raises: every path through [`SyncEngine::sync`] ends in a
//! [`bricksync_types::SyncReport`].

#![allow(
    clippy::significant_drop_tightening,
    reason = "Mutex guards are held for the whole state transition on purpose"
)]
#![allow(clippy::module_name_repetitions, reason = "Types are re-exported at the crate root")]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod credentials;
pub mod error;
pub mod logging;
pub mod modules;
pub mod remote;
pub mod store;
pub mod sync;

pub use credentials::{ConfigCredentials, CredentialProvider, StaticCredentials};
pub use error::{CoreError, CoreResult};
pub use remote::{RateLimitTracker, ResilientCaller};
pub use sync::SyncEngine;
