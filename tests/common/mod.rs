//! A fake upstream serving both networks' endpoints on one local port.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use handlefinder::config::Config;

/// Delay of the `slowpoke` lookup, longer than a one-second client timeout.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(3);

#[derive(Default)]
pub struct Calls {
    pub lookups: AtomicUsize,
    pub following: AtomicUsize,
    pub target: AtomicUsize,
    pub pagination_tokens: std::sync::Mutex<Vec<Option<String>>>,
    pub page_sizes: std::sync::Mutex<Vec<String>>,
    pub auth_headers: std::sync::Mutex<Vec<String>>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
            + self.following.load(Ordering::SeqCst)
            + self.target.load(Ordering::SeqCst)
    }
}

pub struct Upstream {
    pub source_base: String,
    pub target_base: String,
    pub calls: Arc<Calls>,
}

impl Upstream {
    pub async fn spawn() -> Self {
        let calls = Arc::new(Calls::default());

        let app = Router::new()
            .route("/2/users/by/username/{username}", get(lookup_user))
            .route("/2/users/{id}/following", get(following))
            .route("/v2/search", get(search_accounts))
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            source_base: format!("http://{addr}/2"),
            target_base: format!("http://{addr}/v2"),
            calls,
        }
    }

    /// Config pointing at this upstream, with a fresh SQLite file and no pacing.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.general.database_path = temp_database_url();
        config.source.base_url = self.source_base.clone();
        config.source.auth_token = "source-token".to_string();
        config.target.base_url = self.target_base.clone();
        config.target.auth_token = "target-token".to_string();
        config.search.enrichment_delay_ms = 0;
        config.observability.metrics_enabled = false;
        config
    }
}

pub fn temp_database_url() -> String {
    let path = std::env::temp_dir().join(format!("handlefinder-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", path.display())
}

async fn lookup_user(
    State(calls): State<Arc<Calls>>,
    Path(username): Path<String>,
    headers: axum::http::HeaderMap,
) -> Json<Value> {
    calls.lookups.fetch_add(1, Ordering::SeqCst);
    if let Some(auth) = headers.get("authorization").and_then(|h| h.to_str().ok()) {
        calls.auth_headers.lock().unwrap().push(auth.to_string());
    }

    match username.as_str() {
        "alice" => Json(json!({"data": {"id": "42", "name": "Alice", "username": "alice"}})),
        "hermit" => Json(json!({"data": {"id": "7", "name": "Hermit", "username": "hermit"}})),
        "slowpoke" => {
            tokio::time::sleep(SLOW_RESPONSE).await;
            Json(json!({"data": {"id": "9"}}))
        }
        "denied" => Json(json!({
            "title": "Unauthorized",
            "type": "about:blank",
            "status": 401,
            "detail": "Unauthorized"
        })),
        other => Json(json!({
            "errors": [{
                "value": other,
                "detail": format!("Could not find user with username: [{other}]."),
                "title": "Not Found Error"
            }]
        })),
    }
}

async fn following(
    State(calls): State<Arc<Calls>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    calls.following.fetch_add(1, Ordering::SeqCst);
    let token = query.get("pagination_token").cloned();
    calls.pagination_tokens.lock().unwrap().push(token.clone());
    if let Some(size) = query.get("max_results") {
        calls.page_sizes.lock().unwrap().push(size.clone());
    }

    match (id.as_str(), token.as_deref()) {
        ("42", None) => Json(json!({
            "data": [
                {"id": "1", "username": "bob", "name": "Bob", "description": "now at @bob@mast.example"},
                {"id": "2", "username": "carl", "name": "Carl", "description": "no handle here"}
            ],
            "meta": {"result_count": 2, "next_token": "page2"}
        })),
        ("42", Some("page2")) => Json(json!({
            "data": [
                {"id": "3", "username": "dora", "name": "Dora @dora@fedi.example", "description": "painter"},
                {"id": "4", "username": "eve", "name": "Eve", "description": "moved to @eve@gone.example"}
            ],
            "meta": {"result_count": 2}
        })),
        ("7", _) => Json(json!({"meta": {"result_count": 0}})),
        _ => Json(json!({
            "errors": [{"detail": "Sorry, that page does not exist.", "title": "Not Found Error"}]
        })),
    }
}

async fn search_accounts(
    State(calls): State<Arc<Calls>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    calls.target.fetch_add(1, Ordering::SeqCst);

    match query.get("q").map(String::as_str) {
        Some("@bob@mast.example") => Json(json!({
            "accounts": [{"acct": "bob@mast.example", "display_name": "Bob M", "note": "<p>Bob on the fediverse</p>"}],
            "statuses": [],
            "hashtags": []
        })),
        Some("@dora@fedi.example") => Json(json!({
            "accounts": [{"acct": "dora@fedi.example", "display_name": "Dora F", "note": "<p>paints things</p>"}],
            "statuses": [],
            "hashtags": []
        })),
        Some("@broken@bad.example") => Json(json!({"error": "This method requires an authenticated user"})),
        _ => Json(json!({"accounts": [], "statuses": [], "hashtags": []})),
    }
}
