use serde::{Deserialize, Serialize};

use crate::models::ReconciledAccount;
use crate::services::SearchOutcome;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /search` (form) and `POST /api/search` (JSON).
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub date: Option<String>,
}

/// Context of the `search_result.html` template.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub search: String,
    pub results: Vec<ReconciledAccount>,
    pub errors: Vec<String>,
    pub using_cache: bool,
    pub cache_info: CacheInfo,
}

impl From<SearchOutcome> for SearchPage {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            search: outcome.username,
            results: outcome.results,
            errors: outcome.errors,
            using_cache: outcome.using_cache,
            cache_info: CacheInfo {
                date: outcome.cache_date,
            },
        }
    }
}

impl SearchPage {
    /// A page that only reports errors, for requests that never reached a search.
    #[must_use]
    pub fn failed(search: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            results: Vec::new(),
            errors: vec![error.into()],
            using_cache: false,
            cache_info: CacheInfo { date: None },
        }
    }
}
