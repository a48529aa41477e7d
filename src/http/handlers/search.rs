//! Search handler.

use axum::extract::{Extension, Query, State};
use axum::Json;

use super::HandlerResult;
use crate::http::dto::{SearchQuery, SearchResponse};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::TenantContext;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 50;

/// GET /v1/search?q=...&limit=...
///
/// Query the tenant's search index, fed from the event bus.
pub async fn search(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<SearchResponse> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' is required".to_string()))?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let hits = state.search.search(ctx.tenant_id, q, limit);
    Ok(Json(SearchResponse {
        query: q.to_string(),
        hits,
    }))
}
