//! Domain event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AuditedRecord, EntityKind, TenantId};

/// What happened to the entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Created => "created",
            EventAction::Updated => "updated",
            EventAction::Deleted => "deleted",
        }
    }
}

/// A domain mutation event, emitted after the repository write commits.
///
/// `revision` is the entity's `updated_at` at emission time. Consumers use
/// it for idempotent check-then-write handling: applying the same event
/// twice, or an older event after a newer one, is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    pub tenant_id: TenantId,
    pub entity: EntityKind,
    pub entity_id: i64,
    pub action: EventAction,
    pub occurred_at: DateTime<Utc>,
    pub revision: DateTime<Utc>,
    /// JSON snapshot of the entity after the mutation.
    pub payload: serde_json::Value,
}

impl DomainEvent {
    /// Build an event from an entity snapshot.
    ///
    /// Serialization of domain entities is infallible; a failure here is a
    /// programming error and degrades to a null payload rather than
    /// poisoning the mutation path.
    pub fn from_record<T>(action: EventAction, record: &T) -> Self
    where
        T: AuditedRecord + Serialize,
    {
        Self {
            event_id: Uuid::new_v4(),
            tenant_id: TenantId::new(record.record_tenant_id()),
            entity: T::KIND,
            entity_id: record.record_id(),
            action,
            occurred_at: Utc::now(),
            revision: record.audit().updated_at,
            payload: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Identity of the entity this event concerns.
    pub fn key(&self) -> (i64, EntityKind, i64) {
        (self.tenant_id.value(), self.entity, self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Audit, Notification, NotificationId};

    #[test]
    fn test_from_record_captures_identity_and_revision() {
        let notification = Notification {
            id: NotificationId::new(7),
            tenant_id: TenantId::new(3),
            recipient: "vet@clinic".to_string(),
            subject: "Low stock".to_string(),
            body: "Reorder wormer".to_string(),
            read: false,
            audit: Audit::new("system"),
        };

        let event = DomainEvent::from_record(EventAction::Created, &notification);
        assert_eq!(event.key(), (3, EntityKind::Notification, 7));
        assert_eq!(event.revision, notification.audit.updated_at);
        assert_eq!(event.payload["subject"], "Low stock");
    }
}
