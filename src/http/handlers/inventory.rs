//! Inventory CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateInventoryItem, PageQuery, UpdateInventoryItem};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{EntityKind, InventoryItem, InventoryItemId, TenantContext};
use crate::services::inventory as service;

/// GET /v1/inventory
pub async fn list_inventory_items(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::InventoryItem, query, |page| {
        service::list_inventory_items(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/inventory
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>), AppError> {
    let item = service::create_inventory_item(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /v1/inventory/{id}
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<InventoryItem> {
    let item =
        service::get_inventory_item(state.repository.as_ref(), &ctx, InventoryItemId::new(id))
            .await?;
    Ok(Json(item))
}

/// PUT /v1/inventory/{id}
pub async fn update_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateInventoryItem>,
) -> HandlerResult<InventoryItem> {
    let item = service::update_inventory_item(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        InventoryItemId::new(id),
        input,
    )
    .await?;
    Ok(Json(item))
}

/// DELETE /v1/inventory/{id}
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_inventory_item(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        InventoryItemId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
