use std::sync::Arc;
use std::time::Duration;

use bricksync_types::{ListId, RemoteConfig, SyncError};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::wire::{Created, NamedList, Page};
use crate::remote::caller::{CallError, RemoteRequest, RemoteResponse, ResilientCaller};

pub const PAGE_SIZE: u32 = 100;
/// Guard against a remote that never stops returning `next`.
pub const MAX_PAGES: u32 = 500;

/// Items gathered while paging, with how far paging got.
#[derive(Debug)]
pub struct PagedRead<T> {
    pub items: Vec<T>,
    pub pages: u32,
    pub failure: Option<String>,
    /// The read stopped on a 429.
    pub rate_limited: bool,
}

/// Authenticated access to one user's Rebrickable account.
#[derive(Debug)]
pub struct RebrickableApi {
    caller: Arc<ResilientCaller>,
    api_key: String,
    user_token: String,
    single_timeout: Duration,
    bulk_timeout: Duration,
}

impl RebrickableApi {
    pub fn new(
        caller: Arc<ResilientCaller>,
        api_key: impl Into<String>,
        user_token: impl Into<String>,
        remote: &RemoteConfig,
    ) -> Self {
        Self {
            caller,
            api_key: api_key.into(),
            user_token: user_token.into(),
            single_timeout: Duration::from_secs(remote.timeout_secs.max(1)),
            bulk_timeout: Duration::from_secs(remote.bulk_timeout_secs.max(1)),
        }
    }

    pub fn caller(&self) -> &ResilientCaller {
        &self.caller
    }

    /// Path below `users/{token}/`.
    pub fn user_path(&self, suffix: &str) -> String {
        format!("users/{}/{}", super::segment(&self.user_token), suffix)
    }

    fn authorize(&self, request: RemoteRequest) -> RemoteRequest {
        request.header("Authorization", format!("key {}", self.api_key))
    }

    /// Page reads and single-item writes.
    pub async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, CallError> {
        let request = self.authorize(request.timeout(self.single_timeout));
        self.caller.call(&request).await
    }

    /// Bulk submissions get the longer timeout.
    pub async fn send_bulk(&self, request: RemoteRequest) -> Result<RemoteResponse, CallError> {
        let request = self.authorize(request.timeout(self.bulk_timeout));
        self.caller.call(&request).await
    }

    /// Follow `next` markers until the last page, a failure, or [`MAX_PAGES`].
    pub async fn read_pages<T: DeserializeOwned>(&self, path: &str) -> PagedRead<T> {
        self.read_pages_sized(path, PAGE_SIZE, false).await
    }

    /// [`read_pages`](Self::read_pages) with a custom page size. Large pages
    /// can ask for the bulk timeout.
    pub async fn read_pages_sized<T: DeserializeOwned>(
        &self,
        path: &str,
        page_size: u32,
        large: bool,
    ) -> PagedRead<T> {
        let mut read = PagedRead { items: Vec::new(), pages: 0, failure: None, rate_limited: false };
        let mut page = 1u32;

        loop {
            if page > MAX_PAGES {
                warn!(path, pages = read.pages, "Page limit reached, treating read as partial");
                read.failure = Some(format!("stopped after {} pages", MAX_PAGES));
                break;
            }

            let request =
                RemoteRequest::get(path).query("page", page).query("page_size", page_size);
            let sent =
                if large { self.send_bulk(request).await } else { self.send(request).await };
            let page_result = match sent {
                Ok(response) if response.is_success() => response.json::<Page<T>>(),
                Ok(response) => Err(response.to_error()),
                Err(e) => Err(SyncError::from(e)),
            };

            match page_result {
                Ok(body) => {
                    read.items.extend(body.results);
                    read.pages += 1;
                    if body.next.is_none() {
                        break;
                    }
                    page += 1;
                },
                Err(e) => {
                    read.rate_limited = e.is_rate_limited();
                    warn!(path, page, error = %e, "Failed to read page");
                    read.failure = Some(format!("page {}: {}", page, e));
                    break;
                },
            }
        }

        debug!(path, pages = read.pages, items = read.items.len(), "Paged read finished");
        read
    }

    /// Find a set list or part list by name, creating it when absent.
    ///
    /// `collection` is `setlists` or `partlists`.
    pub async fn find_or_create_list(
        &self,
        collection: &str,
        name: &str,
        create_body: serde_json::Value,
    ) -> Result<(ListId, bool), SyncError> {
        let unavailable =
            |reason: String| SyncError::ListUnavailable { name: name.to_string(), reason };

        let path = self.user_path(&format!("{}/", collection));
        let lists = self.read_pages::<NamedList>(&path).await;
        if let Some(existing) = lists.items.iter().find(|list| list.name == name) {
            debug!(collection, name, id = existing.id, "Found existing list");
            return Ok((ListId::new(existing.id.to_string()), false));
        }
        // Never create a duplicate when we could not see every list
        if let Some(failure) = lists.failure {
            return Err(unavailable(format!("could not enumerate {}: {}", collection, failure)));
        }

        info!(collection, name, "Creating remote list");
        let response = self
            .send(RemoteRequest::post(path, create_body))
            .await
            .map_err(|e| unavailable(SyncError::from(e).to_string()))?;
        if !response.is_success() {
            return Err(unavailable(response.to_error().to_string()));
        }
        let created: Created = response.json().map_err(|e| unavailable(e.to_string()))?;
        info!(collection, name, id = created.id, "Remote list created");
        Ok((ListId::new(created.id.to_string()), true))
    }
}
