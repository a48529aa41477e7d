//! Appointment (scheduling) services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ensure_animal_exists, ensure_customer_exists, publish_event};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    AnimalId, Appointment, AppointmentId, AppointmentStatus, Audit, CustomerId, ListPage,
    PageRequest, TenantContext,
};

/// Request body for booking an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub customer_id: i64,
    #[serde(default)]
    pub animal_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for updating an appointment. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointment {
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub animal_id: Option<i64>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

pub async fn create_appointment(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateAppointment,
) -> RepositoryResult<Appointment> {
    let appointment = Appointment {
        id: AppointmentId::new(0),
        tenant_id: ctx.tenant_id,
        customer_id: CustomerId::new(input.customer_id),
        animal_id: input.animal_id.map(AnimalId::new),
        starts_at: input.starts_at,
        ends_at: input.ends_at,
        reason: input.reason,
        status: AppointmentStatus::Scheduled,
        audit: Audit::new(ctx.principal.clone()),
    };
    appointment.validate().map_err(RepositoryError::validation)?;
    ensure_customer_exists(repo, ctx.tenant_id, appointment.customer_id).await?;
    if let Some(animal_id) = appointment.animal_id {
        ensure_animal_exists(repo, ctx.tenant_id, animal_id).await?;
    }

    let stored = repo.insert_appointment(&appointment).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_appointment(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: AppointmentId,
    input: UpdateAppointment,
) -> RepositoryResult<Appointment> {
    let mut appointment = repo.fetch_appointment(ctx.tenant_id, id).await?;

    if let Some(customer_id) = input.customer_id {
        appointment.customer_id = CustomerId::new(customer_id);
        ensure_customer_exists(repo, ctx.tenant_id, appointment.customer_id).await?;
    }
    if let Some(animal_id) = input.animal_id {
        appointment.animal_id = Some(AnimalId::new(animal_id));
        ensure_animal_exists(repo, ctx.tenant_id, AnimalId::new(animal_id)).await?;
    }
    if let Some(starts_at) = input.starts_at {
        appointment.starts_at = starts_at;
    }
    if let Some(ends_at) = input.ends_at {
        appointment.ends_at = ends_at;
    }
    if let Some(reason) = input.reason {
        appointment.reason = Some(reason);
    }
    if let Some(status) = input.status {
        appointment.status = status;
    }
    appointment.validate().map_err(RepositoryError::validation)?;
    appointment.audit.touch(ctx.principal.clone());

    let stored = repo.update_appointment(&appointment).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_appointment(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: AppointmentId,
) -> RepositoryResult<Appointment> {
    repo.fetch_appointment(ctx.tenant_id, id).await
}

pub async fn list_appointments(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<Appointment>> {
    repo.list_appointments(ctx.tenant_id, page).await
}

pub async fn delete_appointment(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: AppointmentId,
) -> RepositoryResult<()> {
    let mut appointment = repo.fetch_appointment(ctx.tenant_id, id).await?;
    repo.soft_delete_appointment(ctx.tenant_id, id, &ctx.principal)
        .await?;

    appointment.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &appointment).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::models::TenantId;
    use crate::services::customers::{create_customer, CreateCustomer};
    use chrono::Duration;

    fn ctx() -> TenantContext {
        TenantContext::new(TenantId::new(1), "api:test")
    }

    #[tokio::test]
    async fn test_booking_and_completion() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();

        let customer = create_customer(
            &repo,
            &bus,
            &ctx,
            CreateCustomer {
                name: "Ada".to_string(),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let now = Utc::now();
        let appointment = create_appointment(
            &repo,
            &bus,
            &ctx,
            CreateAppointment {
                customer_id: customer.id.value(),
                animal_id: None,
                starts_at: now,
                ends_at: now + Duration::minutes(30),
                reason: Some("checkup".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);

        let completed = update_appointment(
            &repo,
            &bus,
            &ctx,
            appointment.id,
            UpdateAppointment {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_inverted_time_range_rejected() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();

        let customer = create_customer(
            &repo,
            &bus,
            &ctx,
            CreateCustomer {
                name: "Ada".to_string(),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let now = Utc::now();
        let err = create_appointment(
            &repo,
            &bus,
            &ctx,
            CreateAppointment {
                customer_id: customer.id.value(),
                animal_id: None,
                starts_at: now,
                ends_at: now - Duration::minutes(5),
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }
}
