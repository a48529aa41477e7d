//! Document services.
//!
//! The stored checksum is always recomputed from the content on write, so
//! a document row can never carry a checksum that disagrees with its body.

use serde::{Deserialize, Serialize};

use super::{ensure_animal_exists, ensure_customer_exists, publish_event};
use crate::db::checksum::calculate_checksum;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    AnimalId, Audit, CustomerId, Document, DocumentId, ListPage, PageRequest, TenantContext,
};

/// Request body for storing a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub title: String,
    pub content_type: String,
    /// Document body; binary payloads are base64-encoded by the caller.
    pub content: String,
    #[serde(default)]
    pub animal_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
}

/// Request body for updating a document. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub animal_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
}

async fn ensure_links_exist(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    animal_id: Option<AnimalId>,
    customer_id: Option<CustomerId>,
) -> RepositoryResult<()> {
    if let Some(animal_id) = animal_id {
        ensure_animal_exists(repo, ctx.tenant_id, animal_id).await?;
    }
    if let Some(customer_id) = customer_id {
        ensure_customer_exists(repo, ctx.tenant_id, customer_id).await?;
    }
    Ok(())
}

pub async fn create_document(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateDocument,
) -> RepositoryResult<Document> {
    let checksum = calculate_checksum(&input.content);
    let document = Document {
        id: DocumentId::new(0),
        tenant_id: ctx.tenant_id,
        title: input.title,
        content_type: input.content_type,
        content: input.content,
        checksum,
        animal_id: input.animal_id.map(AnimalId::new),
        customer_id: input.customer_id.map(CustomerId::new),
        audit: Audit::new(ctx.principal.clone()),
    };
    document.validate().map_err(RepositoryError::validation)?;
    ensure_links_exist(repo, ctx, document.animal_id, document.customer_id).await?;

    let stored = repo.insert_document(&document).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_document(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: DocumentId,
    input: UpdateDocument,
) -> RepositoryResult<Document> {
    let mut document = repo.fetch_document(ctx.tenant_id, id).await?;

    if let Some(title) = input.title {
        document.title = title;
    }
    if let Some(content_type) = input.content_type {
        document.content_type = content_type;
    }
    if let Some(content) = input.content {
        document.content = content;
    }
    if let Some(animal_id) = input.animal_id {
        document.animal_id = Some(AnimalId::new(animal_id));
    }
    if let Some(customer_id) = input.customer_id {
        document.customer_id = Some(CustomerId::new(customer_id));
    }
    document.checksum = calculate_checksum(&document.content);
    document.validate().map_err(RepositoryError::validation)?;
    ensure_links_exist(repo, ctx, document.animal_id, document.customer_id).await?;
    document.audit.touch(ctx.principal.clone());

    let stored = repo.update_document(&document).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_document(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: DocumentId,
) -> RepositoryResult<Document> {
    repo.fetch_document(ctx.tenant_id, id).await
}

pub async fn list_documents(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<Document>> {
    repo.list_documents(ctx.tenant_id, page).await
}

pub async fn delete_document(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: DocumentId,
) -> RepositoryResult<()> {
    let mut document = repo.fetch_document(ctx.tenant_id, id).await?;
    repo.soft_delete_document(ctx.tenant_id, id, &ctx.principal)
        .await?;

    document.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &document).await;
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
    async fn test_checksum_computed_and_refreshed() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = ctx();

        let document = create_document(
            &repo,
            &bus,
            &ctx,
            CreateDocument {
                title: "Vaccination record".to_string(),
                content_type: "text/plain".to_string(),
                content: "rabies 2026-08-01".to_string(),
                animal_id: None,
                customer_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(document.checksum, calculate_checksum("rabies 2026-08-01"));

        let updated = update_document(
            &repo,
            &bus,
            &ctx,
            document.id,
            UpdateDocument {
                content: Some("rabies 2026-08-02".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.checksum, calculate_checksum("rabies 2026-08-02"));
        assert_ne!(updated.checksum, document.checksum);
    }

    #[tokio::test]
    async fn test_link_to_missing_animal_rejected() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();

        let err = create_document(
            &repo,
            &bus,
            &ctx(),
            CreateDocument {
                title: "X-ray".to_string(),
                content_type: "image/png".to_string(),
                content: "bm90IGEgcmVhbCBpbWFnZQ==".to_string(),
                animal_id: Some(404),
                customer_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }
}
