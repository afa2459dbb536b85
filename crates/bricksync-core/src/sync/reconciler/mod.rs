//! One reconciliation run over a single remote list.
//!
//! Reads both sides, computes the diff, resolves remote identifiers and
//! applies the phases in the order the domain requires. Every path ends in
//! a [`SyncReport`]; a failed read ends the run before any write.


use std::collections::BTreeMap;

use bricksync_types::{Domain, ExecutionResult, ListId, PlannedUpdate, SetNum, SyncReport, WriteItem};
use tracing::{error, info, warn};

use super::diff::{diff, remote_map};
use super::executor::BatchExecutor;
use super::local::LocalStateReader;
use super::ops::{AddOp, RemoveOp, ReplaceItem, ReplaceOp};
use super::resolver::KeyResolver;
use crate::remote::RemoteListAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Add,
    Update,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOrder([Phase; 3]);

impl PhaseOrder {
    /// Sets: new entries first, stale ones last.
    pub const ADD_FIRST: Self = Self([Phase::Add, Phase::Update, Phase::Remove]);
    /// Parts: clear stale entries before adding.
    pub const REMOVE_FIRST: Self = Self([Phase::Remove, Phase::Add, Phase::Update]);

    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Sets => Self::ADD_FIRST,
            Domain::MissingParts | Domain::MissingPartList => Self::REMOVE_FIRST,
        }
    }

    pub fn phases(&self) -> [Phase; 3] {
        self.0
    }
}

pub struct Reconciler<A, R> {
    domain: Domain,
    adapter: A,
    resolver: R,
    executor: BatchExecutor,
    order: PhaseOrder,
}

impl<A, R> Reconciler<A, R>
where
    A: RemoteListAdapter,
    R: KeyResolver<A::Key>,
{
    pub fn new(domain: Domain, adapter: A, resolver: R, executor: BatchExecutor) -> Self {
        Self { domain, adapter, resolver, executor, order: PhaseOrder::for_domain(domain) }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub async fn reconcile(
        &self,
        list: &ListId,
        local: &dyn LocalStateReader<A::Key>,
        mut report: SyncReport,
    ) -> SyncReport {
        let domain = self.domain;

        let local = match local.read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(%domain, error = %e, "Failed to read local state, aborting run");
                return report.read_failed(format!("local state unavailable: {}", e));
            },
        };
        report.total_local = local.len();

        let snapshot = self.adapter.read_all(list).await;
        if snapshot.is_failed() {
            let reason = snapshot.failure.unwrap_or_else(|| "unknown error".to_string());
            error!(%domain, list_id = %list, error = %reason, "Failed to read remote list, aborting run");
            return report.read_failed(format!("remote list unavailable: {}", reason));
        }
        let remote_complete = snapshot.complete;
        let remote_failure = snapshot.failure;
        let remote = remote_map(snapshot.records);
        report.total_remote = remote.len();

        let plan = diff(&local.quantities, &remote);
        info!(
            %domain,
            list_id = %list,
            local = report.total_local,
            remote = report.total_remote,
            to_add = plan.to_add.len(),
            to_update = plan.to_update.len(),
            to_remove = plan.to_remove.len(),
            "Diff computed"
        );
        if plan.is_empty() {
            return report.finish();
        }

        let mut add_items: Vec<WriteItem<A::Key>> =
            plan.to_add.iter().map(|(key, &quantity)| WriteItem::new(key.clone(), quantity)).collect();
        if !remote_complete && !add_items.is_empty() {
            // Entries on unread pages would be added a second time
            warn!(
                %domain,
                deferred = add_items.len(),
                "Remote list only partially read, deferring additions"
            );
            report.deferred += add_items.len();
            report.errors.push(format!(
                "remote list read incomplete ({}); {} additions deferred",
                remote_failure.as_deref().unwrap_or("unknown error"),
                add_items.len()
            ));
            add_items.clear();
        }

        let (add_items, replace_items) =
            self.resolve(add_items, &plan.to_update, &local.origins, &mut report).await;

        let mut stop_writes = false;
        for phase in self.order.phases() {
            let planned = match phase {
                Phase::Add => add_items.len(),
                Phase::Update => replace_items.len(),
                Phase::Remove => plan.to_remove.len(),
            };
            if planned == 0 {
                continue;
            }
            if stop_writes {
                info!(%domain, ?phase, deferred = planned, "Skipping phase after rate limiting");
                report.rate_limited += planned;
                report.deferred += planned;
                continue;
            }

            let result = match phase {
                Phase::Add => {
                    self.executor.execute(list, &add_items, &AddOp::new(&self.adapter)).await
                },
                Phase::Update => {
                    self.executor.execute(list, &replace_items, &ReplaceOp::new(&self.adapter)).await
                },
                Phase::Remove => {
                    self.executor.execute(list, &plan.to_remove, &RemoveOp::new(&self.adapter)).await
                },
            };
            info!(
                %domain,
                ?phase,
                attempted = result.attempted,
                succeeded = result.succeeded,
                rate_limited = result.rate_limited,
                errors = result.errors.len(),
                "Phase finished"
            );
            stop_writes = result.rate_limited > 0;
            Self::tally(&mut report, phase, result);
        }

        let report = report.finish();
        info!(
            %domain,
            added = report.added,
            updated = report.updated,
            removed = report.removed,
            rate_limited = report.rate_limited,
            errors = report.errors.len(),
            "Sync finished"
        );
        report
    }

    /// Resolve adds and updates in a single pass so each lookup is shared.
    async fn resolve(
        &self,
        add_items: Vec<WriteItem<A::Key>>,
        updates: &[PlannedUpdate<A::Key>],
        origins: &BTreeMap<A::Key, SetNum>,
        report: &mut SyncReport,
    ) -> (Vec<WriteItem<A::Key>>, Vec<ReplaceItem<A::Key>>) {
        let add_count = add_items.len();
        let mut pending = add_items;
        pending.extend(updates.iter().map(|u| WriteItem::new(u.key.clone(), u.new_quantity)));
        if pending.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let is_add: BTreeMap<A::Key, bool> = pending
            .iter()
            .enumerate()
            .map(|(position, item)| (item.key.clone(), position < add_count))
            .collect();

        let resolution = self.resolver.resolve(pending, origins).await;
        report.unresolved += resolution.unresolved.len();

        let mut resolved_ids: BTreeMap<A::Key, Option<String>> = BTreeMap::new();
        let mut add_items = Vec::with_capacity(add_count);
        for item in resolution.resolved {
            if is_add.get(&item.key).copied().unwrap_or(false) {
                add_items.push(item);
            } else {
                resolved_ids.insert(item.key.clone(), item.resolved_id);
            }
        }

        let replace_items = updates
            .iter()
            .filter_map(|update| {
                resolved_ids.remove(&update.key).map(|resolved_id| ReplaceItem {
                    update: update.clone(),
                    resolved_id,
                })
            })
            .collect();

        (add_items, replace_items)
    }

    fn tally(report: &mut SyncReport, phase: Phase, result: ExecutionResult) {
        match phase {
            Phase::Add => report.added += result.succeeded,
            Phase::Update => report.updated += result.succeeded,
            Phase::Remove => report.removed += result.succeeded,
        }
        report.rate_limited += result.rate_limited;
        report.deferred += result.deferred;
        report.errors.extend(result.errors);
    }
}
