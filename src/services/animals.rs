//! Animal services.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ensure_customer_exists, publish_event};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    Animal, AnimalId, Audit, CustomerId, ListPage, PageRequest, TenantContext,
};

/// Request body for registering an animal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnimal {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub customer_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for updating an animal. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAnimal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_animal(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateAnimal,
) -> RepositoryResult<Animal> {
    let animal = Animal {
        id: AnimalId::new(0),
        tenant_id: ctx.tenant_id,
        name: input.name,
        species: input.species,
        breed: input.breed,
        date_of_birth: input.date_of_birth,
        customer_id: CustomerId::new(input.customer_id),
        notes: input.notes,
        audit: Audit::new(ctx.principal.clone()),
    };
    animal.validate().map_err(RepositoryError::validation)?;
    ensure_customer_exists(repo, ctx.tenant_id, animal.customer_id).await?;

    let stored = repo.insert_animal(&animal).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_animal(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: AnimalId,
    input: UpdateAnimal,
) -> RepositoryResult<Animal> {
    let mut animal = repo.fetch_animal(ctx.tenant_id, id).await?;

    if let Some(name) = input.name {
        animal.name = name;
    }
    if let Some(species) = input.species {
        animal.species = species;
    }
    if let Some(breed) = input.breed {
        animal.breed = Some(breed);
    }
    if let Some(date_of_birth) = input.date_of_birth {
        animal.date_of_birth = Some(date_of_birth);
    }
    if let Some(customer_id) = input.customer_id {
        animal.customer_id = CustomerId::new(customer_id);
        ensure_customer_exists(repo, ctx.tenant_id, animal.customer_id).await?;
    }
    if let Some(notes) = input.notes {
        animal.notes = Some(notes);
    }
    animal.validate().map_err(RepositoryError::validation)?;
    animal.audit.touch(ctx.principal.clone());

    let stored = repo.update_animal(&animal).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_animal(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: AnimalId,
) -> RepositoryResult<Animal> {
    repo.fetch_animal(ctx.tenant_id, id).await
}

pub async fn list_animals(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<Animal>> {
    repo.list_animals(ctx.tenant_id, page).await
}

pub async fn delete_animal(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: AnimalId,
) -> RepositoryResult<()> {
    let mut animal = repo.fetch_animal(ctx.tenant_id, id).await?;
    repo.soft_delete_animal(ctx.tenant_id, id, &ctx.principal)
        .await?;

    animal.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &animal).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::models::TenantId;
    use crate::services::customers::{create_customer, CreateCustomer};

    fn ctx() -> TenantContext {
        TenantContext::new(TenantId::new(1), "api:test")
    }

    async fn seed_customer(repo: &LocalRepository, bus: &InMemoryEventBus) -> i64 {
        create_customer(
            repo,
            bus,
            &ctx(),
            CreateCustomer {
                name: "Ada".to_string(),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap()
        .id
        .value()
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_owner() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();

        let err = create_animal(
            &repo,
            &bus,
            &ctx(),
            CreateAnimal {
                name: "Rex".to_string(),
                species: "dog".to_string(),
                breed: None,
                date_of_birth: None,
                customer_id: 999,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_create_and_reassign_owner() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();
        let owner = seed_customer(&repo, &bus).await;

        let animal = create_animal(
            &repo,
            &bus,
            &ctx,
            CreateAnimal {
                name: "Rex".to_string(),
                species: "dog".to_string(),
                breed: Some("collie".to_string()),
                date_of_birth: None,
                customer_id: owner,
                notes: None,
            },
        )
        .await
        .unwrap();

        // Reassigning to a missing customer fails and leaves the row intact.
        let err = update_animal(
            &repo,
            &bus,
            &ctx,
            animal.id,
            UpdateAnimal {
                customer_id: Some(12345),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        let current = get_animal(&repo, &ctx, animal.id).await.unwrap();
        assert_eq!(current.customer_id.value(), owner);
    }
}
