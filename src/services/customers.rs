//! Customer services.

use serde::{Deserialize, Serialize};

use super::publish_event;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{Audit, Customer, CustomerId, ListPage, PageRequest, TenantContext};

/// Request body for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Request body for updating a customer. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn create_customer(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateCustomer,
) -> RepositoryResult<Customer> {
    let customer = Customer {
        id: CustomerId::new(0),
        tenant_id: ctx.tenant_id,
        name: input.name,
        email: input.email,
        phone: input.phone,
        address: input.address,
        audit: Audit::new(ctx.principal.clone()),
    };
    customer.validate().map_err(RepositoryError::validation)?;

    let stored = repo.insert_customer(&customer).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_customer(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: CustomerId,
    input: UpdateCustomer,
) -> RepositoryResult<Customer> {
    let mut customer = repo.fetch_customer(ctx.tenant_id, id).await?;

    if let Some(name) = input.name {
        customer.name = name;
    }
    if let Some(email) = input.email {
        customer.email = Some(email);
    }
    if let Some(phone) = input.phone {
        customer.phone = Some(phone);
    }
    if let Some(address) = input.address {
        customer.address = Some(address);
    }
    customer.validate().map_err(RepositoryError::validation)?;
    customer.audit.touch(ctx.principal.clone());

    let stored = repo.update_customer(&customer).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_customer(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: CustomerId,
) -> RepositoryResult<Customer> {
    repo.fetch_customer(ctx.tenant_id, id).await
}

pub async fn list_customers(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<Customer>> {
    repo.list_customers(ctx.tenant_id, page).await
}

pub async fn delete_customer(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: CustomerId,
) -> RepositoryResult<()> {
    let mut customer = repo.fetch_customer(ctx.tenant_id, id).await?;
    repo.soft_delete_customer(ctx.tenant_id, id, &ctx.principal)
        .await?;

    customer.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &customer).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::models::TenantId;

    fn ctx() -> TenantContext {
        TenantContext::new(TenantId::new(1), "api:test")
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();

        let err = create_customer(
            &repo,
            &bus,
            &ctx(),
            CreateCustomer {
                name: "".to_string(),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        // Failed validation publishes nothing.
        assert_eq!(bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_create_update_delete_publish_one_event_each() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();

        let stored = create_customer(
            &repo,
            &bus,
            &ctx,
            CreateCustomer {
                name: "Ada".to_string(),
                email: Some("ada@example.com".to_string()),
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(stored.audit.created_by, "api:test");

        update_customer(
            &repo,
            &bus,
            &ctx,
            stored.id,
            UpdateCustomer {
                phone: Some("555-0101".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        delete_customer(&repo, &bus, &ctx, stored.id).await.unwrap();

        assert_eq!(bus.events_published(), 3);
        assert!(get_customer(&repo, &ctx, stored.id).await.is_err());
    }
}
