//! High-level business logic.
//!
//! One module per entity family. Every mutation follows the same shape:
//! validate input, enforce referential integrity, write through the
//! repository, then publish exactly one domain event. Handlers never talk
//! to the repository directly for mutations.

use serde::Serialize;

use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{DomainEvent, EventAction, EventPublisher};
use crate::models::{AnimalId, AuditedRecord, CustomerId, TenantId};

pub mod animals;
pub mod appointments;
pub mod customers;
pub mod documents;
pub mod inventory;
pub mod notifications;
pub mod webhooks;

/// Verify the backing store is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Publish a mutation event for a stored record.
pub(crate) async fn publish_event<T>(bus: &dyn EventPublisher, action: EventAction, record: &T)
where
    T: AuditedRecord + Serialize,
{
    bus.publish(DomainEvent::from_record(action, record)).await;
}

/// Map a failed FK lookup to a validation error; propagate everything else.
fn as_missing_reference(
    result: RepositoryResult<()>,
    entity: &str,
    id: i64,
) -> RepositoryResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(RepositoryError::NotFound { .. }) => Err(RepositoryError::validation(format!(
            "{} {} does not exist",
            entity, id
        ))),
        Err(e) => Err(e),
    }
}

/// Require that a customer row exists (and is not soft-deleted).
pub(crate) async fn ensure_customer_exists(
    repo: &dyn FullRepository,
    tenant: TenantId,
    id: CustomerId,
) -> RepositoryResult<()> {
    as_missing_reference(
        repo.fetch_customer(tenant, id).await.map(|_| ()),
        "customer",
        id.value(),
    )
}

/// Require that an animal row exists (and is not soft-deleted).
pub(crate) async fn ensure_animal_exists(
    repo: &dyn FullRepository,
    tenant: TenantId,
    id: AnimalId,
) -> RepositoryResult<()> {
    as_missing_reference(
        repo.fetch_animal(tenant, id).await.map(|_| ()),
        "animal",
        id.value(),
    )
}
