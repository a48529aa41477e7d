//! Document CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateDocument, PageQuery, UpdateDocument};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{Document, DocumentId, EntityKind, TenantContext};
use crate::services::documents as service;

/// GET /v1/documents
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::Document, query, |page| {
        service::list_documents(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/documents
pub async fn create_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let document =
        service::create_document(state.repository.as_ref(), state.bus.as_ref(), &ctx, input)
            .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /v1/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<Document> {
    let document =
        service::get_document(state.repository.as_ref(), &ctx, DocumentId::new(id)).await?;
    Ok(Json(document))
}

/// PUT /v1/documents/{id}
pub async fn update_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateDocument>,
) -> HandlerResult<Document> {
    let document = service::update_document(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        DocumentId::new(id),
        input,
    )
    .await?;
    Ok(Json(document))
}

/// DELETE /v1/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_document(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        DocumentId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
