//! HTML routes.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use super::templates::render_template;
use super::{ApiError, AppState, SearchPage, SearchRequest};
use crate::services::SearchError;

const SEARCH_FAILED: &str = "Search failed, please try again later";

#[derive(Debug, Deserialize)]
pub struct CacheDeleteQuery {
    #[serde(default)]
    pub username: String,
}

/// `GET /`
pub async fn home() -> Result<Html<String>, ApiError> {
    Ok(Html(render_template("home.html", minijinja::context! {})?))
}

/// `POST /search`
///
/// Errors reported by the networks are part of the page, and so is a failing
/// cache store; only an invalid username turns into a 400.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(request): Form<SearchRequest>,
) -> Result<Response, ApiError> {
    match state.search_service().search(&request.username).await {
        Ok(outcome) => {
            let html = render_template("search_result.html", SearchPage::from(outcome))?;
            Ok(Html(html).into_response())
        }
        Err(SearchError::Validation(msg)) => {
            let page = SearchPage::failed(request.username.trim(), msg);
            let html = render_template("search_result.html", page)?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
        Err(SearchError::Database(msg)) => {
            error!(
                username = %request.username,
                error = %msg,
                "Search failed on the cache store"
            );
            let page = SearchPage::failed(request.username.trim(), SEARCH_FAILED);
            let html = render_template("search_result.html", page)?;
            Ok(Html(html).into_response())
        }
    }
}

/// `GET /cache/delete?username=...`
///
/// Always lands back on the home page; an unusable username has nothing to
/// invalidate.
pub async fn cache_delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CacheDeleteQuery>,
) -> Result<Redirect, ApiError> {
    match state.search_service().invalidate(&query.username).await {
        Ok(_) => {}
        Err(SearchError::Validation(msg)) => {
            debug!(username = %query.username, reason = %msg, "Ignoring invalidation request");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/"))
}
