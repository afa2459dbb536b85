//! Per-domain wiring of adapters, resolvers and local readers.

use std::collections::HashMap;
use std::sync::Arc;

use bricksync_types::{Domain, SyncConfig, SyncReport};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::executor::BatchExecutor;
use super::local::{LocalStateReader, MissingPartsReader, OwnedSetsReader};
use super::reconciler::Reconciler;
use super::resolver::{IdentityResolver, InventoryKeyResolver, KeyResolver};
use crate::credentials::CredentialProvider;
use crate::error::CoreResult;
use crate::remote::rebrickable::{
    LostPartsAdapter, PartListAdapter, RebrickableApi, SetListAdapter,
};
use crate::remote::{RateLimitTracker, RemoteListAdapter, ResilientCaller};
use crate::store::LocalStore;

/// Entry point for sync runs.
///
/// One engine serves every domain and shares a single caller, so all runs
/// feed the same rate-limit tracker. Runs of the same domain never overlap:
/// a second request while one is active is skipped.
pub struct SyncEngine {
    config: SyncConfig,
    caller: Arc<ResilientCaller>,
    store: Arc<dyn LocalStore>,
    credentials: Arc<dyn CredentialProvider>,
    running: HashMap<Domain, Mutex<()>>,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        caller: Arc<ResilientCaller>,
        store: Arc<dyn LocalStore>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let running = Domain::ALL.into_iter().map(|domain| (domain, Mutex::new(()))).collect();
        Self { config, caller, store, credentials, running }
    }

    pub fn from_config(
        config: SyncConfig,
        store: Arc<dyn LocalStore>,
        credentials: Arc<dyn CredentialProvider>,
        tracker: Arc<RateLimitTracker>,
        cancel: CancellationToken,
    ) -> CoreResult<Self> {
        let caller = Arc::new(ResilientCaller::from_config(&config, tracker, cancel)?);
        Ok(Self::new(config, caller, store, credentials))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn caller(&self) -> &Arc<ResilientCaller> {
        &self.caller
    }

    pub fn tracker(&self) -> &Arc<RateLimitTracker> {
        self.caller.tracker()
    }

    pub async fn sync(&self, domain: Domain) -> SyncReport {
        if self.caller.cancel_token().is_cancelled() {
            return SyncReport::skipped(domain, "shutting down");
        }

        let (api_key, user_token) = match self.credentials.require() {
            Ok(pair) => pair,
            Err(e) => {
                info!(%domain, error = %e, "Rebrickable credentials not configured, skipping sync");
                return SyncReport::skipped(domain, e.to_string());
            },
        };

        let Some(lock) = self.running.get(&domain) else {
            return SyncReport::skipped(domain, "domain not registered");
        };
        let Ok(_guard) = lock.try_lock() else {
            warn!(%domain, "Sync already running, skipping overlapping run");
            return SyncReport::skipped(domain, "a sync for this domain is already running");
        };

        let api = Arc::new(RebrickableApi::new(
            Arc::clone(&self.caller),
            api_key,
            user_token,
            &self.config.remote,
        ));
        let settings = self.config.domain(domain);
        let executor = BatchExecutor::with_cancel(
            self.config.batch_size_for(domain),
            self.caller.cancel_token().clone(),
        );

        info!(%domain, list = %settings.list_name, "Starting sync");
        match domain {
            Domain::Sets => {
                let reconciler = Reconciler::new(
                    domain,
                    SetListAdapter::new(api),
                    IdentityResolver,
                    executor,
                );
                let local = OwnedSetsReader::new(Arc::clone(&self.store));
                Self::run(domain, &reconciler, &settings.list_name, &local).await
            },
            Domain::MissingParts => {
                let reconciler = Reconciler::new(
                    domain,
                    LostPartsAdapter::new(Arc::clone(&api)),
                    InventoryKeyResolver::new(api),
                    executor,
                );
                let local = MissingPartsReader::new(Arc::clone(&self.store), settings.include_spare);
                Self::run(domain, &reconciler, &settings.list_name, &local).await
            },
            Domain::MissingPartList => {
                let reconciler = Reconciler::new(
                    domain,
                    PartListAdapter::new(api),
                    IdentityResolver,
                    executor,
                );
                let local = MissingPartsReader::new(Arc::clone(&self.store), settings.include_spare);
                Self::run(domain, &reconciler, &settings.list_name, &local).await
            },
        }
    }

    async fn run<A, R>(
        domain: Domain,
        reconciler: &Reconciler<A, R>,
        list_name: &str,
        local: &dyn LocalStateReader<A::Key>,
    ) -> SyncReport
    where
        A: RemoteListAdapter,
        R: KeyResolver<A::Key>,
    {
        let mut report = SyncReport::new(domain);
        match reconciler.adapter().ensure_list(list_name).await {
            Ok((list_id, created)) => {
                report.list_id = Some(list_id.clone());
                report.list_created = created;
                reconciler.reconcile(&list_id, local, report).await
            },
            Err(e) => {
                warn!(%domain, list = list_name, error = %e, "Remote list unavailable");
                report.read_failed(e.to_string())
            },
        }
    }
}
