use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, InvalidateResponse, SearchRequest};
use crate::services::SearchOutcome;

/// `POST /api/search`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchOutcome>>, ApiError> {
    let outcome = state.search_service().search(&request.username).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// `DELETE /api/cache/{username}`
pub async fn invalidate(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<InvalidateResponse>>, ApiError> {
    if state.search_service().invalidate(&username).await? {
        Ok(Json(ApiResponse::success(InvalidateResponse { removed: true })))
    } else {
        Err(ApiError::not_found("Cached search for", username))
    }
}
