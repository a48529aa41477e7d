//! Customer CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateCustomer, PageQuery, UpdateCustomer};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{Customer, CustomerId, EntityKind, TenantContext};
use crate::services::customers as service;

/// GET /v1/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::Customer, query, |page| {
        service::list_customers(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer =
        service::create_customer(state.repository.as_ref(), state.bus.as_ref(), &ctx, input)
            .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /v1/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<Customer> {
    let customer =
        service::get_customer(state.repository.as_ref(), &ctx, CustomerId::new(id)).await?;
    Ok(Json(customer))
}

/// PUT /v1/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCustomer>,
) -> HandlerResult<Customer> {
    let customer = service::update_customer(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        CustomerId::new(id),
        input,
    )
    .await?;
    Ok(Json(customer))
}

/// DELETE /v1/customers/{id}
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_customer(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        CustomerId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
