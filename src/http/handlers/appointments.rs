//! Appointment CRUD handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{cached_list, HandlerResult};
use crate::http::dto::{CreateAppointment, PageQuery, UpdateAppointment};
use crate::http::error::AppError;
use crate::http::state::AppState;
use crate::models::{Appointment, AppointmentId, EntityKind, TenantContext};
use crate::services::appointments as service;

/// GET /v1/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    cached_list(&state, &ctx, EntityKind::Appointment, query, |page| {
        service::list_appointments(state.repository.as_ref(), &ctx, page)
    })
    .await
}

/// POST /v1/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = service::create_appointment(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /v1/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> HandlerResult<Appointment> {
    let appointment =
        service::get_appointment(state.repository.as_ref(), &ctx, AppointmentId::new(id))
            .await?;
    Ok(Json(appointment))
}

/// PUT /v1/appointments/{id}
pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateAppointment>,
) -> HandlerResult<Appointment> {
    let appointment = service::update_appointment(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        AppointmentId::new(id),
        input,
    )
    .await?;
    Ok(Json(appointment))
}

/// DELETE /v1/appointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service::delete_appointment(
        state.repository.as_ref(),
        state.bus.as_ref(),
        &ctx,
        AppointmentId::new(id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
