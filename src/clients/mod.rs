//! Clients for the two external networks.
//!
//! Every call returns an [`ApiOutcome`]: the value when the remote side answered
//! with what we asked for, plus any error messages the remote API reported for
//! that call. Transport failures are logged inside the client and surface as an
//! empty outcome, never as an `Err`.

pub mod source;
pub mod target;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::{SourceAccount, TargetProfile};

pub use source::SourceClient;
pub use target::TargetClient;

/// Result of a single client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOutcome<T> {
    pub value: Option<T>,
    pub errors: Vec<String>,
}

impl<T> ApiOutcome<T> {
    #[must_use]
    pub const fn found(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub const fn rejected(errors: Vec<String>) -> Self {
        Self {
            value: None,
            errors,
        }
    }

    /// Nothing came back at all (connection, timeout or decode failure).
    #[must_use]
    pub const fn unavailable() -> Self {
        Self::rejected(Vec::new())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    BaseUrl(String),
}

/// The network whose following graph is walked.
#[async_trait]
pub trait SourceNetwork: Send + Sync {
    async fn find_user_id(&self, username: &str) -> ApiOutcome<u64>;

    async fn find_following(&self, user_id: u64) -> ApiOutcome<Vec<SourceAccount>>;
}

/// The network whose handles are looked up.
#[async_trait]
pub trait TargetNetwork: Send + Sync {
    async fn find_account(&self, handle: &str) -> ApiOutcome<TargetProfile>;
}

/// Appends path segments to a configured base URL, escaping each one.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|()| ClientError::BaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Both APIs send structured JSON error bodies with 4xx statuses, so the body is
/// decoded regardless of status.
pub(crate) async fn get_json<T>(
    http: &Client,
    url: Url,
    auth_token: &str,
    timeout: Duration,
) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    let response = http
        .get(url)
        .bearer_auth(auth_token)
        .timeout(timeout)
        .send()
        .await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_escapes_segments() {
        let url = endpoint("https://api.example.com/2", &["users", "by", "username", "a b"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/2/users/by/username/a%20b"
        );

        let url = endpoint("https://api.example.com/2/", &["users"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/2/users");
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(endpoint("not a url", &["x"]).is_err());
        assert!(matches!(
            endpoint("mailto:someone@example.com", &["x"]),
            Err(ClientError::BaseUrl(_))
        ));
    }

    #[test]
    fn test_outcome_constructors() {
        let found = ApiOutcome::found(7_u64);
        assert_eq!(found.value, Some(7));
        assert!(found.errors.is_empty());

        let rejected: ApiOutcome<u64> = ApiOutcome::rejected(vec!["Not found".to_string()]);
        assert_eq!(rejected.value, None);
        assert_eq!(rejected.errors, vec!["Not found"]);

        let unavailable: ApiOutcome<u64> = ApiOutcome::unavailable();
        assert_eq!(unavailable.value, None);
        assert!(unavailable.errors.is_empty());
    }
}
