//! Diesel row types for the Postgres repository and their conversions to
//! and from the domain entities.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{
    animals, appointments, customers, documents, inventory_items, notifications,
    webhook_endpoints,
};
use crate::db::repository::RepositoryError;
use crate::models::{
    Animal, Appointment, Audit, Customer, Document, EntityKind, InventoryItem, Notification,
    WebhookEndpoint,
};

fn audit_from_columns(
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
) -> Audit {
    Audit {
        created_at,
        created_by,
        updated_at,
        updated_by,
        deleted_at,
        deleted_by,
    }
}

// ==================== customers ====================

#[derive(Debug, Clone, Queryable)]
pub struct CustomerRow {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub tenant_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers, treat_none_as_null = true)]
pub struct CustomerChangeset {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        }
    }
}

impl From<&Customer> for NewCustomerRow {
    fn from(customer: &Customer) -> Self {
        NewCustomerRow {
            tenant_id: customer.tenant_id.value(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            created_at: customer.audit.created_at,
            created_by: customer.audit.created_by.clone(),
            updated_at: customer.audit.updated_at,
            updated_by: customer.audit.updated_by.clone(),
        }
    }
}

impl From<&Customer> for CustomerChangeset {
    fn from(customer: &Customer) -> Self {
        CustomerChangeset {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            updated_at: customer.audit.updated_at,
            updated_by: customer.audit.updated_by.clone(),
        }
    }
}

// ==================== animals ====================

#[derive(Debug, Clone, Queryable)]
pub struct AnimalRow {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_id: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = animals)]
pub struct NewAnimalRow {
    pub tenant_id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_id: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = animals, treat_none_as_null = true)]
pub struct AnimalChangeset {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_id: i64,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl From<AnimalRow> for Animal {
    fn from(row: AnimalRow) -> Self {
        Animal {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            name: row.name,
            species: row.species,
            breed: row.breed,
            date_of_birth: row.date_of_birth,
            customer_id: row.customer_id.into(),
            notes: row.notes,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        }
    }
}

impl From<&Animal> for NewAnimalRow {
    fn from(animal: &Animal) -> Self {
        NewAnimalRow {
            tenant_id: animal.tenant_id.value(),
            name: animal.name.clone(),
            species: animal.species.clone(),
            breed: animal.breed.clone(),
            date_of_birth: animal.date_of_birth,
            customer_id: animal.customer_id.value(),
            notes: animal.notes.clone(),
            created_at: animal.audit.created_at,
            created_by: animal.audit.created_by.clone(),
            updated_at: animal.audit.updated_at,
            updated_by: animal.audit.updated_by.clone(),
        }
    }
}

impl From<&Animal> for AnimalChangeset {
    fn from(animal: &Animal) -> Self {
        AnimalChangeset {
            name: animal.name.clone(),
            species: animal.species.clone(),
            breed: animal.breed.clone(),
            date_of_birth: animal.date_of_birth,
            customer_id: animal.customer_id.value(),
            notes: animal.notes.clone(),
            updated_at: animal.audit.updated_at,
            updated_by: animal.audit.updated_by.clone(),
        }
    }
}

// ==================== inventory_items ====================

#[derive(Debug, Clone, Queryable)]
pub struct InventoryItemRow {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inventory_items)]
pub struct NewInventoryItemRow {
    pub tenant_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = inventory_items, treat_none_as_null = true)]
pub struct InventoryItemChangeset {
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl From<InventoryItemRow> for InventoryItem {
    fn from(row: InventoryItemRow) -> Self {
        InventoryItem {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            name: row.name,
            sku: row.sku,
            quantity: row.quantity,
            unit: row.unit,
            reorder_level: row.reorder_level,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        }
    }
}

impl From<&InventoryItem> for NewInventoryItemRow {
    fn from(item: &InventoryItem) -> Self {
        NewInventoryItemRow {
            tenant_id: item.tenant_id.value(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            reorder_level: item.reorder_level,
            created_at: item.audit.created_at,
            created_by: item.audit.created_by.clone(),
            updated_at: item.audit.updated_at,
            updated_by: item.audit.updated_by.clone(),
        }
    }
}

impl From<&InventoryItem> for InventoryItemChangeset {
    fn from(item: &InventoryItem) -> Self {
        InventoryItemChangeset {
            name: item.name.clone(),
            sku: item.sku.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            reorder_level: item.reorder_level,
            updated_at: item.audit.updated_at,
            updated_by: item.audit.updated_by.clone(),
        }
    }
}

// ==================== documents ====================

#[derive(Debug, Clone, Queryable)]
pub struct DocumentRow {
    pub id: i64,
    pub tenant_id: i64,
    pub title: String,
    pub content_type: String,
    pub content: String,
    pub checksum: String,
    pub animal_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocumentRow {
    pub tenant_id: i64,
    pub title: String,
    pub content_type: String,
    pub content: String,
    pub checksum: String,
    pub animal_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = documents, treat_none_as_null = true)]
pub struct DocumentChangeset {
    pub title: String,
    pub content_type: String,
    pub content: String,
    pub checksum: String,
    pub animal_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            title: row.title,
            content_type: row.content_type,
            content: row.content,
            checksum: row.checksum,
            animal_id: row.animal_id.map(Into::into),
            customer_id: row.customer_id.map(Into::into),
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        }
    }
}

impl From<&Document> for NewDocumentRow {
    fn from(document: &Document) -> Self {
        NewDocumentRow {
            tenant_id: document.tenant_id.value(),
            title: document.title.clone(),
            content_type: document.content_type.clone(),
            content: document.content.clone(),
            checksum: document.checksum.clone(),
            animal_id: document.animal_id.map(|id| id.value()),
            customer_id: document.customer_id.map(|id| id.value()),
            created_at: document.audit.created_at,
            created_by: document.audit.created_by.clone(),
            updated_at: document.audit.updated_at,
            updated_by: document.audit.updated_by.clone(),
        }
    }
}

impl From<&Document> for DocumentChangeset {
    fn from(document: &Document) -> Self {
        DocumentChangeset {
            title: document.title.clone(),
            content_type: document.content_type.clone(),
            content: document.content.clone(),
            checksum: document.checksum.clone(),
            animal_id: document.animal_id.map(|id| id.value()),
            customer_id: document.customer_id.map(|id| id.value()),
            updated_at: document.audit.updated_at,
            updated_by: document.audit.updated_by.clone(),
        }
    }
}

// ==================== appointments ====================

#[derive(Debug, Clone, Queryable)]
pub struct AppointmentRow {
    pub id: i64,
    pub tenant_id: i64,
    pub customer_id: i64,
    pub animal_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointmentRow {
    pub tenant_id: i64,
    pub customer_id: i64,
    pub animal_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments, treat_none_as_null = true)]
pub struct AppointmentChangeset {
    pub customer_id: i64,
    pub animal_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = RepositoryError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(Appointment {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            customer_id: row.customer_id.into(),
            animal_id: row.animal_id.map(Into::into),
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            reason: row.reason,
            status,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        })
    }
}

impl From<&Appointment> for NewAppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        NewAppointmentRow {
            tenant_id: appointment.tenant_id.value(),
            customer_id: appointment.customer_id.value(),
            animal_id: appointment.animal_id.map(|id| id.value()),
            starts_at: appointment.starts_at,
            ends_at: appointment.ends_at,
            reason: appointment.reason.clone(),
            status: appointment.status.as_str().to_string(),
            created_at: appointment.audit.created_at,
            created_by: appointment.audit.created_by.clone(),
            updated_at: appointment.audit.updated_at,
            updated_by: appointment.audit.updated_by.clone(),
        }
    }
}

impl From<&Appointment> for AppointmentChangeset {
    fn from(appointment: &Appointment) -> Self {
        AppointmentChangeset {
            customer_id: appointment.customer_id.value(),
            animal_id: appointment.animal_id.map(|id| id.value()),
            starts_at: appointment.starts_at,
            ends_at: appointment.ends_at,
            reason: appointment.reason.clone(),
            status: appointment.status.as_str().to_string(),
            updated_at: appointment.audit.updated_at,
            updated_by: appointment.audit.updated_by.clone(),
        }
    }
}

// ==================== notifications ====================

#[derive(Debug, Clone, Queryable)]
pub struct NotificationRow {
    pub id: i64,
    pub tenant_id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    pub tenant_id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notifications, treat_none_as_null = true)]
pub struct NotificationChangeset {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            recipient: row.recipient,
            subject: row.subject,
            body: row.body,
            read: row.read,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        }
    }
}

impl From<&Notification> for NewNotificationRow {
    fn from(notification: &Notification) -> Self {
        NewNotificationRow {
            tenant_id: notification.tenant_id.value(),
            recipient: notification.recipient.clone(),
            subject: notification.subject.clone(),
            body: notification.body.clone(),
            read: notification.read,
            created_at: notification.audit.created_at,
            created_by: notification.audit.created_by.clone(),
            updated_at: notification.audit.updated_at,
            updated_by: notification.audit.updated_by.clone(),
        }
    }
}

impl From<&Notification> for NotificationChangeset {
    fn from(notification: &Notification) -> Self {
        NotificationChangeset {
            recipient: notification.recipient.clone(),
            subject: notification.subject.clone(),
            body: notification.body.clone(),
            read: notification.read,
            updated_at: notification.audit.updated_at,
            updated_by: notification.audit.updated_by.clone(),
        }
    }
}

// ==================== webhook_endpoints ====================

#[derive(Debug, Clone, Queryable)]
pub struct WebhookEndpointRow {
    pub id: i64,
    pub tenant_id: i64,
    pub url: String,
    pub secret: String,
    pub entities: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_endpoints)]
pub struct NewWebhookEndpointRow {
    pub tenant_id: i64,
    pub url: String,
    pub secret: String,
    pub entities: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = webhook_endpoints, treat_none_as_null = true)]
pub struct WebhookEndpointChangeset {
    pub url: String,
    pub secret: String,
    pub entities: serde_json::Value,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

fn entity_kinds_to_json(kinds: &[EntityKind]) -> serde_json::Value {
    // Infallible: EntityKind serializes to plain strings.
    serde_json::to_value(kinds).unwrap_or_else(|_| serde_json::Value::Array(vec![]))
}

impl TryFrom<WebhookEndpointRow> for WebhookEndpoint {
    type Error = RepositoryError;

    fn try_from(row: WebhookEndpointRow) -> Result<Self, Self::Error> {
        let entities: Vec<EntityKind> = serde_json::from_value(row.entities).map_err(|e| {
            RepositoryError::internal(format!("invalid webhook entities column: {}", e))
        })?;
        Ok(WebhookEndpoint {
            id: row.id.into(),
            tenant_id: row.tenant_id.into(),
            url: row.url,
            secret: row.secret,
            entities,
            active: row.active,
            audit: audit_from_columns(
                row.created_at,
                row.created_by,
                row.updated_at,
                row.updated_by,
                row.deleted_at,
                row.deleted_by,
            ),
        })
    }
}

impl From<&WebhookEndpoint> for NewWebhookEndpointRow {
    fn from(endpoint: &WebhookEndpoint) -> Self {
        NewWebhookEndpointRow {
            tenant_id: endpoint.tenant_id.value(),
            url: endpoint.url.clone(),
            secret: endpoint.secret.clone(),
            entities: entity_kinds_to_json(&endpoint.entities),
            active: endpoint.active,
            created_at: endpoint.audit.created_at,
            created_by: endpoint.audit.created_by.clone(),
            updated_at: endpoint.audit.updated_at,
            updated_by: endpoint.audit.updated_by.clone(),
        }
    }
}

impl From<&WebhookEndpoint> for WebhookEndpointChangeset {
    fn from(endpoint: &WebhookEndpoint) -> Self {
        WebhookEndpointChangeset {
            url: endpoint.url.clone(),
            secret: endpoint.secret.clone(),
            entities: entity_kinds_to_json(&endpoint.entities),
            active: endpoint.active,
            updated_at: endpoint.audit.updated_at,
            updated_by: endpoint.audit.updated_by.clone(),
        }
    }
}
