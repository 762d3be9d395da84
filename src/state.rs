use std::sync::Arc;

use crate::clients::{SourceClient, SourceNetwork, TargetClient, TargetNetwork};
use crate::config::Config;
use crate::db::Store;
use crate::services::{ReconciliationEngine, SearchService, pacing};

/// Build a shared HTTP client for both networks. Each request sets its own
/// timeout from the matching config section.
fn build_shared_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("handlefinder/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub search_service: Arc<SearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client()?;

        let source: Arc<dyn SourceNetwork> = Arc::new(SourceClient::with_shared_client(
            http_client.clone(),
            &config.source,
        ));
        let target: Arc<dyn TargetNetwork> = Arc::new(TargetClient::with_shared_client(
            http_client,
            &config.target,
        ));

        Self::with_networks(config, source, target).await
    }

    /// Same as [`SharedState::new`] with caller-supplied network clients.
    pub async fn with_networks(
        config: Config,
        source: Arc<dyn SourceNetwork>,
        target: Arc<dyn TargetNetwork>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let engine = ReconciliationEngine::new(
            source,
            target,
            pacing::from_millis(config.search.enrichment_delay_ms),
        );
        let search_service = Arc::new(SearchService::new(store.clone(), engine));

        Ok(Self {
            config: Arc::new(config),
            store,
            search_service,
        })
    }
}
