//! Webhook endpoint services.

use serde::{Deserialize, Serialize};

use super::publish_event;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    Audit, EntityKind, ListPage, PageRequest, TenantContext, WebhookEndpoint, WebhookEndpointId,
};

/// Request body for registering a webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebhookEndpoint {
    pub url: String,
    pub secret: String,
    /// Entity kinds to subscribe to.
    pub entities: Vec<EntityKind>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Request body for updating a webhook endpoint. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWebhookEndpoint {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub entities: Option<Vec<EntityKind>>,
    #[serde(default)]
    pub active: Option<bool>,
}

pub async fn create_webhook_endpoint(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateWebhookEndpoint,
) -> RepositoryResult<WebhookEndpoint> {
    let endpoint = WebhookEndpoint {
        id: WebhookEndpointId::new(0),
        tenant_id: ctx.tenant_id,
        url: input.url,
        secret: input.secret,
        entities: input.entities,
        active: input.active,
        audit: Audit::new(ctx.principal.clone()),
    };
    endpoint.validate().map_err(RepositoryError::validation)?;

    let stored = repo.insert_webhook_endpoint(&endpoint).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_webhook_endpoint(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: WebhookEndpointId,
    input: UpdateWebhookEndpoint,
) -> RepositoryResult<WebhookEndpoint> {
    let mut endpoint = repo.fetch_webhook_endpoint(ctx.tenant_id, id).await?;

    if let Some(url) = input.url {
        endpoint.url = url;
    }
    if let Some(secret) = input.secret {
        endpoint.secret = secret;
    }
    if let Some(entities) = input.entities {
        endpoint.entities = entities;
    }
    if let Some(active) = input.active {
        endpoint.active = active;
    }
    endpoint.validate().map_err(RepositoryError::validation)?;
    endpoint.audit.touch(ctx.principal.clone());

    let stored = repo.update_webhook_endpoint(&endpoint).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_webhook_endpoint(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: WebhookEndpointId,
) -> RepositoryResult<WebhookEndpoint> {
    repo.fetch_webhook_endpoint(ctx.tenant_id, id).await
}

pub async fn list_webhook_endpoints(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<WebhookEndpoint>> {
    repo.list_webhook_endpoints(ctx.tenant_id, page).await
}

pub async fn delete_webhook_endpoint(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: WebhookEndpointId,
) -> RepositoryResult<()> {
    let mut endpoint = repo.fetch_webhook_endpoint(ctx.tenant_id, id).await?;
    repo.soft_delete_webhook_endpoint(ctx.tenant_id, id, &ctx.principal)
        .await?;

    endpoint.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &endpoint).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::models::TenantId;

    #[tokio::test]
    async fn test_register_and_deactivate() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = TenantContext::new(TenantId::new(1), "api:test");

        let endpoint = create_webhook_endpoint(
            &repo,
            &bus,
            &ctx,
            CreateWebhookEndpoint {
                url: "https://example.com/hook".to_string(),
                secret: "s3cret".to_string(),
                entities: vec![EntityKind::Animal, EntityKind::Appointment],
                active: true,
            },
        )
        .await
        .unwrap();

        let hooks = repo
            .active_webhook_endpoints(ctx.tenant_id, EntityKind::Animal)
            .await
            .unwrap();
        assert_eq!(hooks.len(), 1);

        update_webhook_endpoint(
            &repo,
            &bus,
            &ctx,
            endpoint.id,
            UpdateWebhookEndpoint {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let hooks = repo
            .active_webhook_endpoints(ctx.tenant_id, EntityKind::Animal)
            .await
            .unwrap();
        assert!(hooks.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = TenantContext::new(TenantId::new(1), "api:test");

        let err = create_webhook_endpoint(
            &repo,
            &bus,
            &ctx,
            CreateWebhookEndpoint {
                url: "gopher://example.com".to_string(),
                secret: "s".to_string(),
                entities: vec![EntityKind::Animal],
                active: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }
}
