//! Everything that talks to the remote service.

pub mod adapter;
pub mod caller;
pub mod client_builder;
pub mod rate_limit;
pub mod rebrickable;

pub use adapter::RemoteListAdapter;
pub use caller::{CallError, RemoteRequest, RemoteResponse, ResilientCaller, RetryPolicy};
pub use rate_limit::{RateLimitTracker, TrackerState};
