use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use super::{ApiOutcome, ClientError, TargetNetwork, endpoint, get_json};
use crate::config::TargetApiConfig;
use crate::models::TargetProfile;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    error: Option<serde_json::Value>,
    accounts: Option<Vec<TargetProfile>>,
}

impl SearchResponse {
    /// Assumes handles are unique on the target network, so the first account wins.
    fn into_outcome(self) -> ApiOutcome<TargetProfile> {
        if let Some(error) = self.error {
            let message = match error {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return ApiOutcome::rejected(vec![message]);
        }

        match self.accounts.and_then(|a| a.into_iter().next()) {
            Some(profile) => ApiOutcome::found(profile),
            None => ApiOutcome::rejected(vec!["Not found".to_string()]),
        }
    }
}

#[derive(Clone)]
pub struct TargetClient {
    client: Client,
    base_url: String,
    auth_token: String,
    timeout: Duration,
}

impl TargetClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TargetApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    async fn search(&self, handle: &str) -> Result<SearchResponse, ClientError> {
        let mut url = endpoint(&self.base_url, &["search"])?;
        url.query_pairs_mut().append_pair("q", handle);
        get_json(&self.client, url, &self.auth_token, self.timeout).await
    }
}

#[async_trait]
impl TargetNetwork for TargetClient {
    async fn find_account(&self, handle: &str) -> ApiOutcome<TargetProfile> {
        debug!(handle, "Looking up target account");

        match self.search(handle).await {
            Ok(response) => {
                let outcome = response.into_outcome();
                if !outcome.errors.is_empty() {
                    debug!(handle, errors = ?outcome.errors, "Target API reported errors");
                }
                outcome
            }
            Err(e) => {
                error!(handle, error = %e, "Target account lookup failed");
                ApiOutcome::unavailable()
            }
        }
    }
}
