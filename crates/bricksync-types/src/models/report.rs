//! Summary of one reconciliation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::Domain;
use super::key::ListId;

/// How a run ended. Writes only happen for `Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncOutcome {
    Completed,
    /// Nothing was attempted (no credentials, or a run was already active).
    Skipped { reason: String },
    /// Local or remote state could not be read; no writes were issued.
    ReadFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub domain: Domain,
    pub outcome: SyncOutcome,
    pub list_id: Option<ListId>,
    /// The remote list did not exist and was created by this run.
    pub list_created: bool,
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
    /// Operations rejected for rate limiting, plus those skipped because of it.
    pub rate_limited: usize,
    /// Planned operations left for a later run without being submitted.
    pub deferred: usize,
    /// Items dropped because no remote identifier could be resolved.
    pub unresolved: usize,
    pub errors: Vec<String>,
    pub total_local: usize,
    pub total_remote: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub message: String,
}

impl SyncReport {
    pub fn new(domain: Domain) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            domain,
            outcome: SyncOutcome::Completed,
            list_id: None,
            list_created: false,
            added: 0,
            removed: 0,
            updated: 0,
            rate_limited: 0,
            deferred: 0,
            unresolved: 0,
            errors: Vec::new(),
            total_local: 0,
            total_remote: 0,
            started_at: now,
            finished_at: now,
            message: String::new(),
        }
    }

    pub fn skipped(domain: Domain, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut report = Self::new(domain);
        report.message = format!("Sync skipped: {reason}");
        report.outcome = SyncOutcome::Skipped { reason };
        report
    }

    pub fn read_failed(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.errors.push(reason.clone());
        self.message = format!("Sync aborted before any change: {reason}");
        self.outcome = SyncOutcome::ReadFailed { reason };
        self.finished_at = Utc::now();
        self
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Completed)
    }

    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.updated > 0
    }

    /// Stamp the finish time and compose the human-readable message.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        if self.is_completed() {
            self.message = self.summary_message();
        }
        self
    }

    pub fn summary_message(&self) -> String {
        let mut message = String::from("Synchronization completed. ");
        if self.list_created {
            message.push_str("Remote list created. ");
        }
        if self.has_changes() {
            message.push_str(&format!(
                "Added {}, updated {}, removed {}.",
                self.added, self.updated, self.removed
            ));
        } else {
            message.push_str("No changes needed.");
        }
        if self.rate_limited > 0 {
            message.push_str(&format!(
                " {} operations were rate limited and will be retried on the next run.",
                self.rate_limited
            ));
        }
        if self.unresolved > 0 {
            message.push_str(&format!(
                " {} items could not be matched to a remote inventory entry.",
                self.unresolved
            ));
        }
        if !self.errors.is_empty() {
            message.push_str(&format!(" {} errors.", self.errors.len()));
        }
        message.push_str(&format!(
            " Local entries: {}, remote entries: {}.",
            self.total_local, self.total_remote
        ));
        message
    }
}
