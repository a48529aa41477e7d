//! HTTP handlers for the REST API.
//!
//! Each entity family has its own handler module; every handler delegates
//! to the service layer for business logic. List handlers share the cached
//! pagination convention via [`cached_list`].

use axum::{extract::State, Json};
use std::future::Future;

use super::dto::{HealthResponse, PageQuery};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::RepositoryResult;
use crate::models::{EntityKind, ListPage, PageRequest, TenantContext};
use crate::services;

pub mod animals;
pub mod appointments;
pub mod customers;
pub mod documents;
pub mod inventory;
pub mod notifications;
pub mod search;
pub mod webhooks;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
///
/// Health check endpoint to verify the service is running and the database
/// is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

/// Serve a list endpoint through the shared TTL cache.
///
/// On a miss the page is fetched, serialized once and stored; mutation
/// events for the same `(tenant, kind)` invalidate it (see
/// [`super::cache::run_cache_invalidator`]).
pub(crate) async fn cached_list<T, F, Fut>(
    state: &AppState,
    ctx: &TenantContext,
    kind: EntityKind,
    query: PageQuery,
    fetch: F,
) -> Result<Json<serde_json::Value>, AppError>
where
    T: serde::Serialize,
    F: FnOnce(PageRequest) -> Fut,
    Fut: Future<Output = RepositoryResult<ListPage<T>>>,
{
    let page = PageRequest::new(query.page, query.per_page);
    let key = super::cache::ListCacheKey::new(ctx.tenant_id, kind, page);

    if let Some(cached) = state.list_cache.get(&key) {
        return Ok(Json(cached));
    }

    let result = fetch(page).await?;
    let body = serde_json::to_value(&result).map_err(|e| AppError::Internal(e.to_string()))?;
    state.list_cache.put(key, body.clone());
    Ok(Json(body))
}
