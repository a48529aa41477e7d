//! Notification services.

use serde::{Deserialize, Serialize};

use super::publish_event;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::events::{EventAction, EventPublisher};
use crate::models::{
    Audit, ListPage, Notification, NotificationId, PageRequest, TenantContext,
};

/// Request body for creating a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Request body for updating a notification. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotification {
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Mark as read/unread.
    #[serde(default)]
    pub read: Option<bool>,
}

pub async fn create_notification(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    input: CreateNotification,
) -> RepositoryResult<Notification> {
    let notification = Notification {
        id: NotificationId::new(0),
        tenant_id: ctx.tenant_id,
        recipient: input.recipient,
        subject: input.subject,
        body: input.body,
        read: false,
        audit: Audit::new(ctx.principal.clone()),
    };
    notification
        .validate()
        .map_err(RepositoryError::validation)?;

    let stored = repo.insert_notification(&notification).await?;
    publish_event(bus, EventAction::Created, &stored).await;
    Ok(stored)
}

pub async fn update_notification(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: NotificationId,
    input: UpdateNotification,
) -> RepositoryResult<Notification> {
    let mut notification = repo.fetch_notification(ctx.tenant_id, id).await?;

    if let Some(recipient) = input.recipient {
        notification.recipient = recipient;
    }
    if let Some(subject) = input.subject {
        notification.subject = subject;
    }
    if let Some(body) = input.body {
        notification.body = body;
    }
    if let Some(read) = input.read {
        notification.read = read;
    }
    notification
        .validate()
        .map_err(RepositoryError::validation)?;
    notification.audit.touch(ctx.principal.clone());

    let stored = repo.update_notification(&notification).await?;
    publish_event(bus, EventAction::Updated, &stored).await;
    Ok(stored)
}

pub async fn get_notification(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    id: NotificationId,
) -> RepositoryResult<Notification> {
    repo.fetch_notification(ctx.tenant_id, id).await
}

pub async fn list_notifications(
    repo: &dyn FullRepository,
    ctx: &TenantContext,
    page: PageRequest,
) -> RepositoryResult<ListPage<Notification>> {
    repo.list_notifications(ctx.tenant_id, page).await
}

pub async fn delete_notification(
    repo: &dyn FullRepository,
    bus: &dyn EventPublisher,
    ctx: &TenantContext,
    id: NotificationId,
) -> RepositoryResult<()> {
    let mut notification = repo.fetch_notification(ctx.tenant_id, id).await?;
    repo.soft_delete_notification(ctx.tenant_id, id, &ctx.principal)
        .await?;

    notification.audit.mark_deleted(ctx.principal.clone());
    publish_event(bus, EventAction::Deleted, &notification).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::models::TenantId;

    #[tokio::test]
    async fn test_mark_read() {
        let repo = LocalRepository::new();
        let bus = InMemoryEventBus::new();
        let ctx = TenantContext::new(TenantId::new(1), "api:test");

        let notification = create_notification(
            &repo,
            &bus,
            &ctx,
            CreateNotification {
                recipient: "vet@clinic".to_string(),
                subject: "Low stock".to_string(),
                body: "Reorder wormer".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(!notification.read);

        let updated = update_notification(
            &repo,
            &bus,
            &ctx,
            notification.id,
            UpdateNotification {
                read: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.read);
    }
}
