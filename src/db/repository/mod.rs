//! Repository trait definitions.
//!
//! Each entity family gets its own trait with the five standard operations
//! (insert, update, fetch, paginated list, soft delete); [`FullRepository`]
//! bundles them together with the cross-cutting operations the rest of the
//! backend needs. All operations are tenant-scoped and never surface
//! soft-deleted rows.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` to work with async Rust.

use async_trait::async_trait;

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::models::{
    Animal, AnimalId, Appointment, AppointmentId, Customer, CustomerId, Document, DocumentId,
    EntityKind, InventoryItem, InventoryItemId, ListPage, Notification, NotificationId,
    PageRequest, TenantId, WebhookEndpoint, WebhookEndpointId,
};

/// Repository trait for customer records.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer and return it with its assigned id.
    ///
    /// The caller provides a fully populated entity (id 0 is ignored);
    /// the repository allocates the primary key.
    async fn insert_customer(&self, customer: &Customer) -> RepositoryResult<Customer>;

    /// Persist an updated customer.
    ///
    /// # Returns
    /// * `Ok(Customer)` - The stored row
    /// * `Err(RepositoryError::NotFound)` - If the row is missing or soft-deleted
    async fn update_customer(&self, customer: &Customer) -> RepositoryResult<Customer>;

    /// Fetch a customer by id within a tenant.
    async fn fetch_customer(&self, tenant: TenantId, id: CustomerId)
        -> RepositoryResult<Customer>;

    /// List customers for a tenant, paginated, ordered by id.
    async fn list_customers(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Customer>>;

    /// Soft-delete a customer. Deleting an already-deleted or missing row
    /// yields `NotFound`.
    async fn soft_delete_customer(
        &self,
        tenant: TenantId,
        id: CustomerId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for animal records.
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    async fn insert_animal(&self, animal: &Animal) -> RepositoryResult<Animal>;
    async fn update_animal(&self, animal: &Animal) -> RepositoryResult<Animal>;
    async fn fetch_animal(&self, tenant: TenantId, id: AnimalId) -> RepositoryResult<Animal>;
    async fn list_animals(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Animal>>;
    async fn soft_delete_animal(
        &self,
        tenant: TenantId,
        id: AnimalId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for inventory items.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn insert_inventory_item(&self, item: &InventoryItem) -> RepositoryResult<InventoryItem>;
    async fn update_inventory_item(&self, item: &InventoryItem) -> RepositoryResult<InventoryItem>;
    async fn fetch_inventory_item(
        &self,
        tenant: TenantId,
        id: InventoryItemId,
    ) -> RepositoryResult<InventoryItem>;
    async fn list_inventory_items(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<InventoryItem>>;
    async fn soft_delete_inventory_item(
        &self,
        tenant: TenantId,
        id: InventoryItemId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert_document(&self, document: &Document) -> RepositoryResult<Document>;
    async fn update_document(&self, document: &Document) -> RepositoryResult<Document>;
    async fn fetch_document(&self, tenant: TenantId, id: DocumentId)
        -> RepositoryResult<Document>;
    async fn list_documents(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Document>>;
    async fn soft_delete_document(
        &self,
        tenant: TenantId,
        id: DocumentId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert_appointment(&self, appointment: &Appointment)
        -> RepositoryResult<Appointment>;
    async fn update_appointment(&self, appointment: &Appointment)
        -> RepositoryResult<Appointment>;
    async fn fetch_appointment(
        &self,
        tenant: TenantId,
        id: AppointmentId,
    ) -> RepositoryResult<Appointment>;
    async fn list_appointments(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Appointment>>;
    async fn soft_delete_appointment(
        &self,
        tenant: TenantId,
        id: AppointmentId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(
        &self,
        notification: &Notification,
    ) -> RepositoryResult<Notification>;
    async fn update_notification(
        &self,
        notification: &Notification,
    ) -> RepositoryResult<Notification>;
    async fn fetch_notification(
        &self,
        tenant: TenantId,
        id: NotificationId,
    ) -> RepositoryResult<Notification>;
    async fn list_notifications(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Notification>>;
    async fn soft_delete_notification(
        &self,
        tenant: TenantId,
        id: NotificationId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Repository trait for webhook endpoints.
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn insert_webhook_endpoint(
        &self,
        endpoint: &WebhookEndpoint,
    ) -> RepositoryResult<WebhookEndpoint>;
    async fn update_webhook_endpoint(
        &self,
        endpoint: &WebhookEndpoint,
    ) -> RepositoryResult<WebhookEndpoint>;
    async fn fetch_webhook_endpoint(
        &self,
        tenant: TenantId,
        id: WebhookEndpointId,
    ) -> RepositoryResult<WebhookEndpoint>;
    async fn list_webhook_endpoints(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<WebhookEndpoint>>;
    async fn soft_delete_webhook_endpoint(
        &self,
        tenant: TenantId,
        id: WebhookEndpointId,
        deleted_by: &str,
    ) -> RepositoryResult<()>;
}

/// Combined repository interface used by the service layer and the webhook
/// dispatcher.
#[async_trait]
pub trait FullRepository:
    CustomerRepository
    + AnimalRepository
    + InventoryRepository
    + DocumentRepository
    + AppointmentRepository
    + NotificationRepository
    + WebhookRepository
    + Send
    + Sync
{
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Active webhook endpoints of a tenant subscribed to `kind`.
    ///
    /// Used by the dispatcher on every event; implementations should keep
    /// this cheap (endpoint counts per tenant are small).
    async fn active_webhook_endpoints(
        &self,
        tenant: TenantId,
        kind: EntityKind,
    ) -> RepositoryResult<Vec<WebhookEndpoint>>;
}
