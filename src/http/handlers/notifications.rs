//! Notification CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateNotification, PageQuery, UpdateNotification};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{EntityKind, Notification, NotificationId, TenantContext};
use crate::services::notifications as service;

/// GET /v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::Notification, query, |page| {
        service::list_notifications(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateNotification>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let notification = service::create_notification(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// GET /v1/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<Notification> {
    let notification =
        service::get_notification(state.repository.as_ref(), &ctx, NotificationId::new(id))
            .await?;
    Ok(Json(notification))
}

/// PUT /v1/notifications/{id}
pub async fn update_notification(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNotification>,
) -> HandlerResult<Notification> {
    let notification = service::update_notification(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        NotificationId::new(id),
        input,
    )
    .await?;
    Ok(Json(notification))
}

/// DELETE /v1/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_notification(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        NotificationId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
