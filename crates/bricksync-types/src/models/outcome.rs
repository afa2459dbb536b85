//! Outcomes of remote writes and of executing a batch of them.

use serde::{Deserialize, Serialize};

/// Outcome of a single-item write or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    RateLimited,
    Failed(String),
}

/// Outcome of a bulk submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkOutcome {
    /// Remote accepted the request and acknowledged `count` items.
    Accepted { count: usize },
    /// Remote refused the whole request.
    Rejected { rate_limited: bool, reason: String },
}

/// Tally for one phase of a run.
///
/// `succeeded + rate_limited + errors.len() == attempted` always holds;
/// `deferred` is the part of `rate_limited` that was never submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub rate_limited: usize,
    pub deferred: usize,
    pub errors: Vec<String>,
}

impl ExecutionResult {
    pub fn new(attempted: usize) -> Self {
        Self { attempted, ..Self::default() }
    }

    pub fn is_conserved(&self) -> bool {
        self.succeeded + self.rate_limited + self.errors.len() == self.attempted
    }

    /// Record items that were planned but intentionally left for a later run.
    pub fn defer(&mut self, count: usize) {
        self.rate_limited += count;
        self.deferred += count;
    }
}
