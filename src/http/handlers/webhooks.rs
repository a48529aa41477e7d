//! Webhook endpoint CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateWebhookEndpoint, PageQuery, UpdateWebhookEndpoint};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{EntityKind, TenantContext, WebhookEndpoint, WebhookEndpointId};
use crate::services::webhooks as service;

/// GET /v1/webhooks
pub async fn list_webhook_endpoints(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::WebhookEndpoint, query, |page| {
        service::list_webhook_endpoints(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/webhooks
pub async fn create_webhook_endpoint(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateWebhookEndpoint>,
) -> Result<(StatusCode, Json<WebhookEndpoint>), AppError> {
    let endpoint = service::create_webhook_endpoint(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(endpoint)))
}

/// GET /v1/webhooks/{id}
pub async fn get_webhook_endpoint(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<WebhookEndpoint> {
    let endpoint = service::get_webhook_endpoint(
        state.repository.as_ref(),
        &ctx,
        WebhookEndpointId::new(id),
    )
    .await?;
    Ok(Json(endpoint))
}

/// PUT /v1/webhooks/{id}
pub async fn update_webhook_endpoint(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateWebhookEndpoint>,
) -> HandlerResult<WebhookEndpoint> {
    let endpoint = service::update_webhook_endpoint(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        WebhookEndpointId::new(id),
        input,
    )
    .await?;
    Ok(Json(endpoint))
}

/// DELETE /v1/webhooks/{id}
pub async fn delete_webhook_endpoint(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_webhook_endpoint(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        WebhookEndpointId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
