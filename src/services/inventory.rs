//! Inventory services.

use serde::{Deserialize, Serialize};

use super::publish_event;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    Audit, InventoryItem, InventoryItemId, ListPage, PageRequest, TenantContext,
};

/// Request body for creating an inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInventoryItem {
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reorder_level: Option<i32>,
}

/// Request body for updating an inventory item. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInventoryItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reorder_level: Option<i32>,
}

pub async fn create_inventory_item(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateInventoryItem,
) -> RepositoryResult<InventoryItem> {
    let item = InventoryItem {
        id: InventoryItemId::new(0),
        tenant_id: ctx.tenant_id,
        name: input.name,
        sku: input.sku,
        quantity: input.quantity,
        unit: input.unit,
        reorder_level: input.reorder_level,
        audit: Audit::new(ctx.principal.clone()),
    };
    item.validate().map_err(RepositoryError::validation)?;

    let stored = repo.insert_inventory_item(&item).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_inventory_item(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: InventoryItemId,
    input: UpdateInventoryItem,
) -> RepositoryResult<InventoryItem> {
    let mut item = repo.fetch_inventory_item(ctx.tenant_id, id).await?;

    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(sku) = input.sku {
        item.sku = sku;
    }
    if let Some(quantity) = input.quantity {
        item.quantity = quantity;
    }
    if let Some(unit) = input.unit {
        item.unit = Some(unit);
    }
    if let Some(reorder_level) = input.reorder_level {
        item.reorder_level = Some(reorder_level);
    }
    item.validate().map_err(RepositoryError::validation)?;
    item.audit.touch(ctx.principal.clone());

    let stored = repo.update_inventory_item(&item).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_inventory_item(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: InventoryItemId,
) -> RepositoryResult<InventoryItem> {
    repo.fetch_inventory_item(ctx.tenant_id, id).await
}

pub async fn list_inventory_items(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<InventoryItem>> {
    repo.list_inventory_items(ctx.tenant_id, page).await
}

pub async fn delete_inventory_item(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: InventoryItemId,
) -> RepositoryResult<()> {
    let mut item = repo.fetch_inventory_item(ctx.tenant_id, id).await?;
    repo.soft_delete_inventory_item(ctx.tenant_id, id, &ctx.principal)
        .await?;

    item.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &item).await;
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
    async fn test_negative_quantity_rejected() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();

        let err = create_inventory_item(
            &repo,
            &bus,
            &ctx(),
            CreateInventoryItem {
                name: "Wormer".to_string(),
                sku: "WRM-01".to_string(),
                quantity: -1,
                unit: None,
                reorder_level: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_quantity_update_round_trips() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();

        let item = create_inventory_item(
            &repo,
            &bus,
            &ctx,
            CreateInventoryItem {
                name: "Wormer".to_string(),
                sku: "WRM-01".to_string(),
                quantity: 10,
                unit: Some("box".to_string()),
                reorder_level: Some(3),
            },
        )
        .await
        .unwrap();

        let updated = update_inventory_item(
            &repo,
            &bus,
            &ctx,
            item.id,
            UpdateInventoryItem {
                quantity: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.sku, "WRM-01");
    }
}
