use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{ApiOutcome, ClientError, SourceNetwork, endpoint, get_json};
use crate::config::SourceApiConfig;
use crate::models::SourceAccount;

/// Largest page the following endpoint accepts.
const MAX_PAGE_SIZE: usize = 1000;

const USER_FIELDS: &str = "name,username,description";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    errors: Option<Vec<Problem>>,
    detail: Option<String>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Problem {
    detail: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserId {
    id: serde_json::Value,
}

impl<T> Envelope<T> {
    /// Error strings carried by the body, or `None` when it reports no error.
    fn reported_errors(&self) -> Option<Vec<String>> {
        if let Some(problems) = &self.errors {
            return Some(
                problems
                    .iter()
                    .map(|p| {
                        p.detail
                            .clone()
                            .or_else(|| p.title.clone())
                            .unwrap_or_else(|| "Unknown error".to_string())
                    })
                    .collect(),
            );
        }

        if self.data.is_none() {
            return self.detail.clone().map(|d| vec![d]);
        }

        None
    }

    fn next_token(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_token.as_deref())
    }
}

fn parse_user_id(id: &serde_json::Value) -> Option<u64> {
    match id {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[derive(Clone)]
pub struct SourceClient {
    client: Client,
    base_url: String,
    auth_token: String,
    max_results: usize,
    timeout: Duration,
}

impl SourceClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &SourceApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
            max_results: usize::try_from(config.max_results).unwrap_or(usize::MAX),
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    async fn fetch<T>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut url = endpoint(&self.base_url, segments)?;
        url.query_pairs_mut().extend_pairs(query);
        get_json(&self.client, url, &self.auth_token, self.timeout).await
    }
}

#[async_trait]
impl SourceNetwork for SourceClient {
    async fn find_user_id(&self, username: &str) -> ApiOutcome<u64> {
        debug!(username, "Resolving source user id");

        let body: Envelope<UserId> = match self
            .fetch(&["users", "by", "username", username], &[("user.fields", "id")])
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!(username, error = %e, "Source user lookup failed");
                return ApiOutcome::unavailable();
            }
        };

        if let Some(errors) = body.reported_errors() {
            debug!(username, ?errors, "Source API reported errors");
            return ApiOutcome::rejected(errors);
        }

        let Some(user) = body.data else {
            return ApiOutcome::rejected(vec!["Not found".to_string()]);
        };

        match parse_user_id(&user.id) {
            Some(id) => ApiOutcome::found(id),
            None => {
                warn!(username, id = %user.id, "Source API returned a malformed user id");
                ApiOutcome::rejected(vec!["Malformed user id".to_string()])
            }
        }
    }

    async fn find_following(&self, user_id: u64) -> ApiOutcome<Vec<SourceAccount>> {
        let id = user_id.to_string();
        let mut accounts: Vec<SourceAccount> = Vec::new();
        let mut pagination_token: Option<String> = None;

        loop {
            let page_size = (self.max_results - accounts.len())
                .min(MAX_PAGE_SIZE)
                .to_string();
            let mut query = vec![
                ("max_results", page_size.as_str()),
                ("user.fields", USER_FIELDS),
            ];
            if let Some(token) = pagination_token.as_deref() {
                query.push(("pagination_token", token));
            }

            let body: Envelope<Vec<SourceAccount>> =
                match self.fetch(&["users", id.as_str(), "following"], &query).await {
                    Ok(body) => body,
                    Err(e) => {
                        error!(user_id, error = %e, "Source following fetch failed");
                        if accounts.is_empty() {
                            return ApiOutcome::unavailable();
                        }
                        warn!(
                            user_id,
                            collected = accounts.len(),
                            "Keeping following pages fetched before the failure"
                        );
                        break;
                    }
                };

            if let Some(errors) = body.reported_errors() {
                debug!(user_id, ?errors, "Source API reported errors");
                if accounts.is_empty() {
                    return ApiOutcome::rejected(errors);
                }
                return ApiOutcome {
                    value: Some(accounts),
                    errors,
                };
            }

            let next = body.next_token().map(str::to_string);
            // No data and no error is how an account following nobody looks.
            accounts.extend(body.data.unwrap_or_default());

            match next {
                Some(token) if accounts.len() < self.max_results => {
                    pagination_token = Some(token);
                }
                _ => break,
            }
        }

        accounts.truncate(self.max_results);
        debug!(user_id, count = accounts.len(), "Fetched source following list");
        ApiOutcome::found(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_array_is_reported() {
        let body: Envelope<UserId> = serde_json::from_str(
            r#"{"errors":[{"detail":"Could not find user with username: [nobody].","title":"Not Found Error"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.reported_errors(),
            Some(vec![
                "Could not find user with username: [nobody].".to_string()
            ])
        );
    }

    #[test]
    fn test_detail_without_data_is_reported() {
        let body: Envelope<UserId> =
            serde_json::from_str(r#"{"title":"Unauthorized","detail":"Unauthorized","status":401}"#)
                .unwrap();
        assert_eq!(body.reported_errors(), Some(vec!["Unauthorized".to_string()]));
    }

    #[test]
    fn test_empty_following_page_is_not_an_error() {
        let body: Envelope<Vec<SourceAccount>> =
            serde_json::from_str(r#"{"meta":{"result_count":0}}"#).unwrap();
        assert_eq!(body.reported_errors(), None);
        assert!(body.data.is_none());
        assert_eq!(body.next_token(), None);
    }

    #[test]
    fn test_following_page_decodes_accounts() {
        let body: Envelope<Vec<SourceAccount>> = serde_json::from_str(
            r#"{"data":[{"id":"1","username":"bob","name":"Bob","description":"find me @bob@mast.example"},
                       {"id":"2","username":"quiet","name":"Quiet"}],
                "meta":{"result_count":2,"next_token":"abc"}}"#,
        )
        .unwrap();
        let data = body.data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].description, "find me @bob@mast.example");
        assert_eq!(data[1].description, "");
        assert_eq!(body.next_token(), Some("abc"));
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id(&serde_json::json!("2244994945")), Some(2_244_994_945));
        assert_eq!(parse_user_id(&serde_json::json!(12)), Some(12));
        assert_eq!(parse_user_id(&serde_json::json!("abc")), None);
        assert_eq!(parse_user_id(&serde_json::json!(null)), None);
    }
}
