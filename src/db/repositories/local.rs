//! In-memory repository implementation.
//!
//! Backs unit tests and local development. One [`MemTable`] per entity,
//! plus a process-wide id sequence shared across tables so ids are unique
//! within a repository instance.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::db::repository::{
    AnimalRepository, AppointmentRepository, CustomerRepository, DocumentRepository,
    ErrorContext, FullRepository, InventoryRepository, NotificationRepository, RepositoryError,
    RepositoryResult, WebhookRepository,
};
use crate::models::{
    Animal, AnimalId, Appointment, AppointmentId, AuditedRecord, Customer, CustomerId, Document,
    DocumentId, EntityKind, InventoryItem, InventoryItemId, ListPage, Notification,
    NotificationId, PageRequest, TenantId, WebhookEndpoint, WebhookEndpointId,
};

/// One in-memory table of audited rows.
struct MemTable<T: AuditedRecord> {
    rows: RwLock<HashMap<i64, T>>,
}

impl<T: AuditedRecord> MemTable<T> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn not_found(id: i64) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("{} {} not found", T::KIND, id),
            ErrorContext::default()
                .with_entity(T::KIND.as_str())
                .with_entity_id(id),
        )
    }

    fn insert(&self, next_id: &AtomicI64, mut row: T) -> T {
        let id = next_id.fetch_add(1, Ordering::SeqCst);
        row.set_record_id(id);
        self.rows.write().insert(id, row.clone());
        row
    }

    fn update(&self, row: &T) -> RepositoryResult<T> {
        let mut rows = self.rows.write();
        match rows.get(&row.record_id()) {
            Some(existing)
                if existing.record_tenant_id() == row.record_tenant_id()
                    && !existing.audit().is_deleted() =>
            {
                rows.insert(row.record_id(), row.clone());
                Ok(row.clone())
            }
            _ => Err(Self::not_found(row.record_id())),
        }
    }

    fn fetch(&self, tenant: i64, id: i64) -> RepositoryResult<T> {
        self.rows
            .read()
            .get(&id)
            .filter(|row| row.record_tenant_id() == tenant && !row.audit().is_deleted())
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    fn list(&self, tenant: i64, page: PageRequest) -> ListPage<T> {
        let rows = self.rows.read();
        let mut matching: Vec<T> = rows
            .values()
            .filter(|row| row.record_tenant_id() == tenant && !row.audit().is_deleted())
            .cloned()
            .collect();
        matching.sort_by_key(|row| row.record_id());

        let total = matching.len() as i64;
        let offset = page.offset() as usize;
        let items: Vec<T> = matching
            .into_iter()
            .skip(offset)
            .take(page.per_page as usize)
            .collect();

        ListPage::new(items, total, page)
    }

    fn soft_delete(&self, tenant: i64, id: i64, deleted_by: &str) -> RepositoryResult<()> {
        let mut rows = self.rows.write();
        match rows.get_mut(&id) {
            Some(row) if row.record_tenant_id() == tenant && !row.audit().is_deleted() => {
                row.audit_mut().mark_deleted(deleted_by);
                Ok(())
            }
            _ => Err(Self::not_found(id)),
        }
    }
}

/// In-memory repository for unit testing and local development.
pub struct LocalRepository {
    next_id: AtomicI64,
    customers: MemTable<Customer>,
    animals: MemTable<Animal>,
    inventory: MemTable<InventoryItem>,
    documents: MemTable<Document>,
    appointments: MemTable<Appointment>,
    notifications: MemTable<Notification>,
    webhooks: MemTable<WebhookEndpoint>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            customers: MemTable::new(),
            animals: MemTable::new(),
            inventory: MemTable::new(),
            documents: MemTable::new(),
            appointments: MemTable::new(),
            notifications: MemTable::new(),
            webhooks: MemTable::new(),
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a repository trait impl delegating to one [`MemTable`].
macro_rules! impl_local_crud {
    ($trait:ident, $ty:ty, $id:ty, $table:ident,
     $insert:ident, $update:ident, $fetch:ident, $list:ident, $delete:ident) => {
        #[async_trait]
        impl $trait for LocalRepository {
            async fn $insert(&self, record: &$ty) -> RepositoryResult<$ty> {
                Ok(self.$table.insert(&self.next_id, record.clone()))
            }

            async fn $update(&self, record: &$ty) -> RepositoryResult<$ty> {
                self.$table.update(record)
            }

            async fn $fetch(&self, tenant: TenantId, id: $id) -> RepositoryResult<$ty> {
                self.$table.fetch(tenant.value(), id.value())
            }

            async fn $list(
                &self,
                tenant: TenantId,
                page: PageRequest,
            ) -> RepositoryResult<ListPage<$ty>> {
                Ok(self.$table.list(tenant.value(), page))
            }

            async fn $delete(
                &self,
                tenant: TenantId,
                id: $id,
                deleted_by: &str,
            ) -> RepositoryResult<()> {
                self.$table.soft_delete(tenant.value(), id.value(), deleted_by)
            }
        }
    };
}

impl_local_crud!(
    CustomerRepository, Customer, CustomerId, customers,
    insert_customer, update_customer, fetch_customer, list_customers, soft_delete_customer
);
impl_local_crud!(
    AnimalRepository, Animal, AnimalId, animals,
    insert_animal, update_animal, fetch_animal, list_animals, soft_delete_animal
);
impl_local_crud!(
    InventoryRepository, InventoryItem, InventoryItemId, inventory,
    insert_inventory_item, update_inventory_item, fetch_inventory_item,
    list_inventory_items, soft_delete_inventory_item
);
impl_local_crud!(
    DocumentRepository, Document, DocumentId, documents,
    insert_document, update_document, fetch_document, list_documents, soft_delete_document
);
impl_local_crud!(
    AppointmentRepository, Appointment, AppointmentId, appointments,
    insert_appointment, update_appointment, fetch_appointment,
    list_appointments, soft_delete_appointment
);
impl_local_crud!(
    NotificationRepository, Notification, NotificationId, notifications,
    insert_notification, update_notification, fetch_notification,
    list_notifications, soft_delete_notification
);
impl_local_crud!(
    WebhookRepository, WebhookEndpoint, WebhookEndpointId, webhooks,
    insert_webhook_endpoint, update_webhook_endpoint, fetch_webhook_endpoint,
    list_webhook_endpoints, soft_delete_webhook_endpoint
);

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn active_webhook_endpoints(
        &self,
        tenant: TenantId,
        kind: EntityKind,
    ) -> RepositoryResult<Vec<WebhookEndpoint>> {
        let rows = self.webhooks.rows.read();
        let mut endpoints: Vec<WebhookEndpoint> = rows
            .values()
            .filter(|e| {
                e.record_tenant_id() == tenant.value()
                    && !e.audit.is_deleted()
                    && e.active
                    && e.subscribes_to(kind)
            })
            .cloned()
            .collect();
        endpoints.sort_by_key(|e| e.id.value());
        Ok(endpoints)
    }
}
