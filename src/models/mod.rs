//! Domain model types for the Herdbook backend.
//!
//! Every business entity carries the standard audit block ([`Audit`]) and a
//! tenant id; all reads and writes are scoped to a tenant. Soft-deleted rows
//! (non-null `deleted_at`) never surface through the repository layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod macros;
pub mod pagination;

pub use pagination::{ListPage, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

crate::define_id_type!(i64, TenantId);
crate::define_id_type!(i64, CustomerId);
crate::define_id_type!(i64, AnimalId);
crate::define_id_type!(i64, InventoryItemId);
crate::define_id_type!(i64, DocumentId);
crate::define_id_type!(i64, AppointmentId);
crate::define_id_type!(i64, NotificationId);
crate::define_id_type!(i64, WebhookEndpointId);

/// The kinds of business entities the backend manages.
///
/// Used to tag domain events, scope search documents and archive keys, and
/// select webhook subscriptions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Animal,
    InventoryItem,
    Document,
    Appointment,
    Notification,
    WebhookEndpoint,
}

impl EntityKind {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Animal => "animal",
            EntityKind::InventoryItem => "inventory_item",
            EntityKind::Document => "document",
            EntityKind::Appointment => "appointment",
            EntityKind::Notification => "notification",
            EntityKind::WebhookEndpoint => "webhook_endpoint",
        }
    }

    /// All kinds, in a stable order.
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Customer,
            EntityKind::Animal,
            EntityKind::InventoryItem,
            EntityKind::Document,
            EntityKind::Appointment,
            EntityKind::Notification,
            EntityKind::WebhookEndpoint,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(EntityKind::Customer),
            "animal" => Ok(EntityKind::Animal),
            "inventory_item" => Ok(EntityKind::InventoryItem),
            "document" => Ok(EntityKind::Document),
            "appointment" => Ok(EntityKind::Appointment),
            "notification" => Ok(EntityKind::Notification),
            "webhook_endpoint" => Ok(EntityKind::WebhookEndpoint),
            other => Err(format!("Unknown entity kind: {}", other)),
        }
    }
}

/// Standard audit block shared by every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Audit {
    /// Fresh audit block for a newly created row.
    pub fn new(principal: impl Into<String>) -> Self {
        let principal = principal.into();
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: principal.clone(),
            updated_at: now,
            updated_by: principal,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Stamp an update.
    pub fn touch(&mut self, principal: impl Into<String>) {
        self.updated_at = Utc::now();
        self.updated_by = principal.into();
    }

    /// Stamp a soft delete. Also bumps `updated_at` so the deletion carries
    /// a revision newer than any prior write.
    pub fn mark_deleted(&mut self, principal: impl Into<String>) {
        let principal = principal.into();
        let now = Utc::now();
        self.updated_at = now;
        self.updated_by = principal.clone();
        self.deleted_at = Some(now);
        self.deleted_by = Some(principal);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Common accessors every audited entity provides.
///
/// Lets the in-memory repository and the event layer treat all seven entity
/// types uniformly.
pub trait AuditedRecord: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn record_id(&self) -> i64;
    fn set_record_id(&mut self, id: i64);
    fn record_tenant_id(&self) -> i64;
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;
}

/// The caller identity resolved from a bearer token.
///
/// Stamped into `created_by`/`updated_by` and used to scope every repository
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    /// Principal name recorded in audit fields (e.g. "api:clinic-north").
    pub principal: String,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId, principal: impl Into<String>) -> Self {
        Self {
            tenant_id,
            principal: principal.into(),
        }
    }
}

// ==================== Entities ====================

/// A customer (animal owner) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(Customer, EntityKind::Customer);

impl Customer {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("customer name must not be empty".to_string());
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("invalid email address: {}", email));
            }
        }
        Ok(())
    }
}

/// An animal under the care of a tenant, owned by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub tenant_id: TenantId,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Owning customer.
    pub customer_id: CustomerId,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(Animal, EntityKind::Animal);

impl Animal {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("animal name must not be empty".to_string());
        }
        if self.species.trim().is_empty() {
            return Err("animal species must not be empty".to_string());
        }
        Ok(())
    }
}

/// A stocked inventory item (feed, medication, supplies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub tenant_id: TenantId,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit: Option<String>,
    /// Restock threshold; purely informational.
    pub reorder_level: Option<i32>,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(InventoryItem, EntityKind::InventoryItem);

impl InventoryItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("inventory item name must not be empty".to_string());
        }
        if self.sku.trim().is_empty() {
            return Err("inventory item sku must not be empty".to_string());
        }
        if self.quantity < 0 {
            return Err(format!("quantity must not be negative: {}", self.quantity));
        }
        Ok(())
    }
}

/// A stored document (treatment record, invoice, certificate), optionally
/// linked to an animal and/or customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub tenant_id: TenantId,
    pub title: String,
    pub content_type: String,
    /// Document body; binary payloads are stored base64-encoded.
    pub content: String,
    /// SHA-256 hex digest of `content`, recomputed on every write.
    pub checksum: String,
    pub animal_id: Option<AnimalId>,
    pub customer_id: Option<CustomerId>,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(Document, EntityKind::Document);

impl Document {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("document title must not be empty".to_string());
        }
        if self.content_type.trim().is_empty() {
            return Err("document content_type must not be empty".to_string());
        }
        Ok(())
    }
}

/// Appointment lifecycle status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// A scheduled visit for a customer, optionally tied to a specific animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub animal_id: Option<AnimalId>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(Appointment, EntityKind::Appointment);

impl Appointment {
    pub fn validate(&self) -> Result<(), String> {
        if self.starts_at >= self.ends_at {
            return Err("appointment must start before it ends".to_string());
        }
        Ok(())
    }
}

/// An in-app notification addressed to a user of the tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub tenant_id: TenantId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(Notification, EntityKind::Notification);

impl Notification {
    pub fn validate(&self) -> Result<(), String> {
        if self.recipient.trim().is_empty() {
            return Err("notification recipient must not be empty".to_string());
        }
        if self.subject.trim().is_empty() {
            return Err("notification subject must not be empty".to_string());
        }
        Ok(())
    }
}

/// A registered webhook endpoint.
///
/// Active endpoints receive a signed POST for every mutation of the entity
/// kinds they subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    pub id: WebhookEndpointId,
    pub tenant_id: TenantId,
    pub url: String,
    /// Shared secret used to sign deliveries. Write-only: never serialized
    /// into API responses, event payloads or archive snapshots.
    #[serde(skip_serializing, default)]
    pub secret: String,
    /// Entity kinds this endpoint subscribes to.
    pub entities: Vec<EntityKind>,
    pub active: bool,
    #[serde(flatten)]
    pub audit: Audit,
}

crate::impl_audited_record!(WebhookEndpoint, EntityKind::WebhookEndpoint);

impl WebhookEndpoint {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!("webhook url must be http(s): {}", self.url));
        }
        if self.secret.is_empty() {
            return Err("webhook secret must not be empty".to_string());
        }
        if self.entities.is_empty() {
            return Err("webhook must subscribe to at least one entity kind".to_string());
        }
        Ok(())
    }

    /// Whether this endpoint wants events for `kind`.
    pub fn subscribes_to(&self, kind: EntityKind) -> bool {
        self.entities.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit() -> Audit {
        Audit::new("test")
    }

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in EntityKind::all() {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_audit_touch_advances_updated_at() {
        let mut a = audit();
        let before = a.updated_at;
        a.touch("editor");
        assert!(a.updated_at >= before);
        assert_eq!(a.updated_by, "editor");
        assert_eq!(a.created_by, "test");
    }

    #[test]
    fn test_mark_deleted_sets_tombstone() {
        let mut a = audit();
        a.mark_deleted("remover");
        assert!(a.is_deleted());
        assert_eq!(a.deleted_by.as_deref(), Some("remover"));
        assert_eq!(a.deleted_at, Some(a.updated_at));
    }

    #[test]
    fn test_customer_validation() {
        let mut customer = Customer {
            id: CustomerId::new(0),
            tenant_id: TenantId::new(1),
            name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
            address: None,
            audit: audit(),
        };
        assert!(customer.validate().is_ok());

        customer.email = Some("not-an-email".to_string());
        assert!(customer.validate().is_err());

        customer.email = None;
        customer.name = "  ".to_string();
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_appointment_must_start_before_end() {
        let now = Utc::now();
        let appointment = Appointment {
            id: AppointmentId::new(0),
            tenant_id: TenantId::new(1),
            customer_id: CustomerId::new(1),
            animal_id: None,
            starts_at: now,
            ends_at: now,
            reason: None,
            status: AppointmentStatus::Scheduled,
            audit: audit(),
        };
        assert!(appointment.validate().is_err());
    }

    #[test]
    fn test_webhook_endpoint_validation() {
        let endpoint = WebhookEndpoint {
            id: WebhookEndpointId::new(0),
            tenant_id: TenantId::new(1),
            url: "ftp://example.com/hook".to_string(),
            secret: "s3cret".to_string(),
            entities: vec![EntityKind::Animal],
            active: true,
            audit: audit(),
        };
        assert!(endpoint.validate().is_err());
        assert!(endpoint.subscribes_to(EntityKind::Animal));
        assert!(!endpoint.subscribes_to(EntityKind::Customer));
    }
}
