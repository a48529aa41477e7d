//! Animal CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateAnimal, PageQuery, UpdateAnimal};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{Animal, AnimalId, EntityKind, TenantContext};
use crate::services::animals as service;

/// GET /v1/animals
pub async fn list_animals(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::Animal, query, |page| {
        service::list_animals(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/animals
pub async fn create_animal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateAnimal>,
) -> Result<(StatusCode, Json<Animal>), AppError> {
    let animal =
        service::create_animal(state.repository.as_ref(), state.bus.as_ref(), &ctx, input)
            .await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

/// GET /v1/animals/{id}
pub async fn get_animal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<Animal> {
    let animal = service::get_animal(state.repository.as_ref(), &ctx, AnimalId::new(id)).await?;
    Ok(Json(animal))
}

/// PUT /v1/animals/{id}
pub async fn update_animal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateAnimal>,
) -> HandlerResult<Animal> {
    let animal = service::update_animal(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        AnimalId::new(id),
        input,
    )
    .await?;
    Ok(Json(animal))
}

/// DELETE /v1/animals/{id}
pub async fn delete_animal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_animal(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        AnimalId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
