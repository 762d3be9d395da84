//! Request-level search flow: serve from cache, or reconcile and cache.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::db::{BeginSearch, SearchRecord, Store};
use crate::models::ReconciledAccount;
use crate::services::reconcile::{Reconciliation, ReconciliationEngine};

const MAX_USERNAME_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// What a search request renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub username: String,
    pub results: Vec<ReconciledAccount>,
    pub errors: Vec<String>,
    pub using_cache: bool,
    pub cache_date: Option<String>,
}

/// Trims, drops one leading `@` and checks the source-network username charset.
pub fn normalize_username(raw: &str) -> Result<String, SearchError> {
    let trimmed = raw.trim();
    let username = trimmed.strip_prefix('@').unwrap_or(trimmed);

    if username.is_empty() {
        return Err(SearchError::Validation("Username cannot be empty".to_string()));
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(SearchError::Validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(SearchError::Validation(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(username.to_string())
}

/// `Y-M-D H:M` without zero padding, from an RFC 3339 timestamp.
#[must_use]
pub fn format_cache_date(timestamp: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.format("%Y-%-m-%-d %-H:%-M").to_string())
}

/// One async mutex per username with a search or invalidation in flight.
#[derive(Default)]
struct UsernameLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UsernameLocks {
    fn acquire_handle(&self, username: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locks.entry(username.to_string()).or_default().clone()
    }

    fn release_handle(&self, username: &str, handle: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // The map and `handle` are the only owners: nobody else is waiting.
        if Arc::strong_count(&handle) == 2 {
            locks.remove(username);
        }
    }
}

pub struct SearchService {
    store: Store,
    engine: ReconciliationEngine,
    locks: UsernameLocks,
}

impl SearchService {
    #[must_use]
    pub fn new(store: Store, engine: ReconciliationEngine) -> Self {
        Self {
            store,
            engine,
            locks: UsernameLocks::default(),
        }
    }

    /// Serves cached results when the username was searched before, otherwise
    /// reconciles and caches. Concurrent calls for the same username run one
    /// after the other, so only the first one reaches the networks.
    pub async fn search(&self, raw_username: &str) -> Result<SearchOutcome, SearchError> {
        let username = normalize_username(raw_username)?;
        debug!(username, "Searching");

        let handle = self.locks.acquire_handle(&username);
        let result = {
            let _guard = handle.lock().await;
            self.search_exclusive(&username).await
        };
        self.locks.release_handle(&username, handle);

        result
    }

    /// Returns `false` when the username had never been searched.
    pub async fn invalidate(&self, raw_username: &str) -> Result<bool, SearchError> {
        let username = normalize_username(raw_username)?;

        let handle = self.locks.acquire_handle(&username);
        let result = {
            let _guard = handle.lock().await;
            self.store.invalidate_search(&username).await
        };
        self.locks.release_handle(&username, handle);

        let removed = result?;
        if removed {
            info!(username, "Cache invalidated");
        } else {
            debug!(username, "Nothing cached to invalidate");
        }
        Ok(removed)
    }

    async fn search_exclusive(&self, username: &str) -> Result<SearchOutcome, SearchError> {
        if let Some(record) = self.store.lookup_search(username).await? {
            return self.replay(record).await;
        }

        debug!(username, "Username not found in search cache, saving it now");
        let record = match self.store.begin_search(username).await? {
            BeginSearch::Created(record) => record,
            BeginSearch::Existing(record) => return self.replay(record).await,
        };
        metrics::counter!("handlefinder_cache_misses_total").increment(1);

        let Reconciliation { accounts, errors } = self.engine.reconcile(username).await;

        // The computed results are still returned when caching them fails.
        if let Err(e) = self.store.append_results(record.id, &accounts).await {
            error!(
                username,
                search_id = record.id,
                results = accounts.len(),
                error = ?e,
                "Failed to cache search results"
            );
        }

        Ok(SearchOutcome {
            username: username.to_string(),
            results: accounts,
            errors,
            using_cache: false,
            cache_date: None,
        })
    }

    async fn replay(&self, record: SearchRecord) -> Result<SearchOutcome, SearchError> {
        let rows = self.store.load_results(record.id).await?;
        metrics::counter!("handlefinder_cache_hits_total").increment(1);
        debug!(
            username = %record.username,
            results = rows.len(),
            "Serving search from cache"
        );

        Ok(SearchOutcome {
            cache_date: format_cache_date(&record.updated_at),
            username: record.username,
            results: rows.into_iter().map(ReconciledAccount::from).collect(),
            errors: Vec::new(),
            using_cache: true,
        })
    }
}
