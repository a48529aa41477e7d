//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::warn;

use crate::db::repository::{
    AnimalRepository, AppointmentRepository, CustomerRepository, DocumentRepository,
    ErrorContext, FullRepository, InventoryRepository, NotificationRepository, RepositoryError,
    RepositoryResult, WebhookRepository,
};
use crate::models::{
    Animal, AnimalId, Appointment, AppointmentId, Customer, CustomerId, Document, DocumentId,
    EntityKind, InventoryItem, InventoryItemId, ListPage, Notification, NotificationId,
    PageRequest, TenantId, WebhookEndpoint, WebhookEndpointId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Current pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Run a blocking Diesel operation on the pool, retrying transient
    /// failures with exponential backoff.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Clone + Send + Sync + 'static,
        T: Send + 'static,
    {
        let mut delay = Duration::from_millis(self.config.retry_delay_ms.max(1));
        let mut attempt: u32 = 0;

        loop {
            let pool = self.pool.clone();
            let op = f.clone();
            let result = task::spawn_blocking(move || {
                let mut conn = pool.get().map_err(RepositoryError::from)?;
                op(&mut conn)
            })
            .await
            .map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("blocking task join error: {}", e),
                    ErrorContext::new(operation),
                )
            })?;

            match result {
                Ok(value) => {
                    self.total_queries.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    self.retried_operations.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        operation,
                        attempt,
                        error = %e,
                        "retrying transient repository failure"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    self.failed_queries.fetch_add(1, Ordering::Relaxed);
                    return Err(e.with_operation(operation));
                }
            }
        }
    }
}

impl std::fmt::Debug for PostgresRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRepository")
            .field("max_pool_size", &self.config.max_pool_size)
            .finish()
    }
}

#[async_trait]
impl CustomerRepository for PostgresRepository {
    async fn insert_customer(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let row = NewCustomerRow::from(customer);
        self.run("insert_customer", move |conn| {
            let stored: CustomerRow = diesel::insert_into(customers::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Customer::from(stored))
        })
        .await
    }

    async fn update_customer(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let id = customer.id.value();
        let tenant = customer.tenant_id.value();
        let changeset = CustomerChangeset::from(customer);
        self.run("update_customer", move |conn| {
            let stored: CustomerRow = diesel::update(
                customers::table
                    .filter(customers::id.eq(id))
                    .filter(customers::tenant_id.eq(tenant))
                    .filter(customers::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Ok(Customer::from(stored))
        })
        .await
    }

    async fn fetch_customer(
        &self,
        tenant: TenantId,
        id: CustomerId,
    ) -> RepositoryResult<Customer> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_customer", move |conn| {
            let row: CustomerRow = customers::table
                .filter(customers::id.eq(id))
                .filter(customers::tenant_id.eq(tenant))
                .filter(customers::deleted_at.is_null())
                .first(conn)?;
            Ok(Customer::from(row))
        })
        .await
    }

    async fn list_customers(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Customer>> {
        let tenant = tenant.value();
        self.run("list_customers", move |conn| {
            let total: i64 = customers::table
                .filter(customers::tenant_id.eq(tenant))
                .filter(customers::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<CustomerRow> = customers::table
                .filter(customers::tenant_id.eq(tenant))
                .filter(customers::deleted_at.is_null())
                .order(customers::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            Ok(ListPage::new(
                rows.into_iter().map(Customer::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn soft_delete_customer(
        &self,
        tenant: TenantId,
        id: CustomerId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_customer", move |conn| {
            let n = diesel::update(
                customers::table
                    .filter(customers::id.eq(id))
                    .filter(customers::tenant_id.eq(tenant))
                    .filter(customers::deleted_at.is_null()),
            )
            .set((
                customers::deleted_at.eq(Some(now)),
                customers::deleted_by.eq(Some(by.clone())),
                customers::updated_at.eq(now),
                customers::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "customer {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl AnimalRepository for PostgresRepository {
    async fn insert_animal(&self, animal: &Animal) -> RepositoryResult<Animal> {
        let row = NewAnimalRow::from(animal);
        self.run("insert_animal", move |conn| {
            let stored: AnimalRow = diesel::insert_into(animals::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Animal::from(stored))
        })
        .await
    }

    async fn update_animal(&self, animal: &Animal) -> RepositoryResult<Animal> {
        let id = animal.id.value();
        let tenant = animal.tenant_id.value();
        let changeset = AnimalChangeset::from(animal);
        self.run("update_animal", move |conn| {
            let stored: AnimalRow = diesel::update(
                animals::table
                    .filter(animals::id.eq(id))
                    .filter(animals::tenant_id.eq(tenant))
                    .filter(animals::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Ok(Animal::from(stored))
        })
        .await
    }

    async fn fetch_animal(&self, tenant: TenantId, id: AnimalId) -> RepositoryResult<Animal> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_animal", move |conn| {
            let row: AnimalRow = animals::table
                .filter(animals::id.eq(id))
                .filter(animals::tenant_id.eq(tenant))
                .filter(animals::deleted_at.is_null())
                .first(conn)?;
            Ok(Animal::from(row))
        })
        .await
    }

    async fn list_animals(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Animal>> {
        let tenant = tenant.value();
        self.run("list_animals", move |conn| {
            let total: i64 = animals::table
                .filter(animals::tenant_id.eq(tenant))
                .filter(animals::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<AnimalRow> = animals::table
                .filter(animals::tenant_id.eq(tenant))
                .filter(animals::deleted_at.is_null())
                .order(animals::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            Ok(ListPage::new(
                rows.into_iter().map(Animal::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn soft_delete_animal(
        &self,
        tenant: TenantId,
        id: AnimalId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_animal", move |conn| {
            let n = diesel::update(
                animals::table
                    .filter(animals::id.eq(id))
                    .filter(animals::tenant_id.eq(tenant))
                    .filter(animals::deleted_at.is_null()),
            )
            .set((
                animals::deleted_at.eq(Some(now)),
                animals::deleted_by.eq(Some(by.clone())),
                animals::updated_at.eq(now),
                animals::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "animal {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl InventoryRepository for PostgresRepository {
    async fn insert_inventory_item(
        &self,
        item: &InventoryItem,
    ) -> RepositoryResult<InventoryItem> {
        let row = NewInventoryItemRow::from(item);
        self.run("insert_inventory_item", move |conn| {
            let stored: InventoryItemRow = diesel::insert_into(inventory_items::table)
                .values(&row)
                .get_result(conn)?;
            Ok(InventoryItem::from(stored))
        })
        .await
    }

    async fn update_inventory_item(
        &self,
        item: &InventoryItem,
    ) -> RepositoryResult<InventoryItem> {
        let id = item.id.value();
        let tenant = item.tenant_id.value();
        let changeset = InventoryItemChangeset::from(item);
        self.run("update_inventory_item", move |conn| {
            let stored: InventoryItemRow = diesel::update(
                inventory_items::table
                    .filter(inventory_items::id.eq(id))
                    .filter(inventory_items::tenant_id.eq(tenant))
                    .filter(inventory_items::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Ok(InventoryItem::from(stored))
        })
        .await
    }

    async fn fetch_inventory_item(
        &self,
        tenant: TenantId,
        id: InventoryItemId,
    ) -> RepositoryResult<InventoryItem> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_inventory_item", move |conn| {
            let row: InventoryItemRow = inventory_items::table
                .filter(inventory_items::id.eq(id))
                .filter(inventory_items::tenant_id.eq(tenant))
                .filter(inventory_items::deleted_at.is_null())
                .first(conn)?;
            Ok(InventoryItem::from(row))
        })
        .await
    }

    async fn list_inventory_items(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<InventoryItem>> {
        let tenant = tenant.value();
        self.run("list_inventory_items", move |conn| {
            let total: i64 = inventory_items::table
                .filter(inventory_items::tenant_id.eq(tenant))
                .filter(inventory_items::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<InventoryItemRow> = inventory_items::table
                .filter(inventory_items::tenant_id.eq(tenant))
                .filter(inventory_items::deleted_at.is_null())
                .order(inventory_items::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            Ok(ListPage::new(
                rows.into_iter().map(InventoryItem::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn soft_delete_inventory_item(
        &self,
        tenant: TenantId,
        id: InventoryItemId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_inventory_item", move |conn| {
            let n = diesel::update(
                inventory_items::table
                    .filter(inventory_items::id.eq(id))
                    .filter(inventory_items::tenant_id.eq(tenant))
                    .filter(inventory_items::deleted_at.is_null()),
            )
            .set((
                inventory_items::deleted_at.eq(Some(now)),
                inventory_items::deleted_by.eq(Some(by.clone())),
                inventory_items::updated_at.eq(now),
                inventory_items::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "inventory_item {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl DocumentRepository for PostgresRepository {
    async fn insert_document(&self, document: &Document) -> RepositoryResult<Document> {
        let row = NewDocumentRow::from(document);
        self.run("insert_document", move |conn| {
            let stored: DocumentRow = diesel::insert_into(documents::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Document::from(stored))
        })
        .await
    }

    async fn update_document(&self, document: &Document) -> RepositoryResult<Document> {
        let id = document.id.value();
        let tenant = document.tenant_id.value();
        let changeset = DocumentChangeset::from(document);
        self.run("update_document", move |conn| {
            let stored: DocumentRow = diesel::update(
                documents::table
                    .filter(documents::id.eq(id))
                    .filter(documents::tenant_id.eq(tenant))
                    .filter(documents::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Ok(Document::from(stored))
        })
        .await
    }

    async fn fetch_document(
        &self,
        tenant: TenantId,
        id: DocumentId,
    ) -> RepositoryResult<Document> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_document", move |conn| {
            let row: DocumentRow = documents::table
                .filter(documents::id.eq(id))
                .filter(documents::tenant_id.eq(tenant))
                .filter(documents::deleted_at.is_null())
                .first(conn)?;
            Ok(Document::from(row))
        })
        .await
    }

    async fn list_documents(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Document>> {
        let tenant = tenant.value();
        self.run("list_documents", move |conn| {
            let total: i64 = documents::table
                .filter(documents::tenant_id.eq(tenant))
                .filter(documents::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<DocumentRow> = documents::table
                .filter(documents::tenant_id.eq(tenant))
                .filter(documents::deleted_at.is_null())
                .order(documents::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            Ok(ListPage::new(
                rows.into_iter().map(Document::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn soft_delete_document(
        &self,
        tenant: TenantId,
        id: DocumentId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_document", move |conn| {
            let n = diesel::update(
                documents::table
                    .filter(documents::id.eq(id))
                    .filter(documents::tenant_id.eq(tenant))
                    .filter(documents::deleted_at.is_null()),
            )
            .set((
                documents::deleted_at.eq(Some(now)),
                documents::deleted_by.eq(Some(by.clone())),
                documents::updated_at.eq(now),
                documents::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "document {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl AppointmentRepository for PostgresRepository {
    async fn insert_appointment(
        &self,
        appointment: &Appointment,
    ) -> RepositoryResult<Appointment> {
        let row = NewAppointmentRow::from(appointment);
        self.run("insert_appointment", move |conn| {
            let stored: AppointmentRow = diesel::insert_into(appointments::table)
                .values(&row)
                .get_result(conn)?;
            Appointment::try_from(stored)
        })
        .await
    }

    async fn update_appointment(
        &self,
        appointment: &Appointment,
    ) -> RepositoryResult<Appointment> {
        let id = appointment.id.value();
        let tenant = appointment.tenant_id.value();
        let changeset = AppointmentChangeset::from(appointment);
        self.run("update_appointment", move |conn| {
            let stored: AppointmentRow = diesel::update(
                appointments::table
                    .filter(appointments::id.eq(id))
                    .filter(appointments::tenant_id.eq(tenant))
                    .filter(appointments::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Appointment::try_from(stored)
        })
        .await
    }

    async fn fetch_appointment(
        &self,
        tenant: TenantId,
        id: AppointmentId,
    ) -> RepositoryResult<Appointment> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_appointment", move |conn| {
            let row: AppointmentRow = appointments::table
                .filter(appointments::id.eq(id))
                .filter(appointments::tenant_id.eq(tenant))
                .filter(appointments::deleted_at.is_null())
                .first(conn)?;
            Appointment::try_from(row)
        })
        .await
    }

    async fn list_appointments(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Appointment>> {
        let tenant = tenant.value();
        self.run("list_appointments", move |conn| {
            let total: i64 = appointments::table
                .filter(appointments::tenant_id.eq(tenant))
                .filter(appointments::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<AppointmentRow> = appointments::table
                .filter(appointments::tenant_id.eq(tenant))
                .filter(appointments::deleted_at.is_null())
                .order(appointments::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            let items = rows
                .into_iter()
                .map(Appointment::try_from)
                .collect::<RepositoryResult<Vec<_>>>()?;
            Ok(ListPage::new(items, total, page))
        })
        .await
    }

    async fn soft_delete_appointment(
        &self,
        tenant: TenantId,
        id: AppointmentId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_appointment", move |conn| {
            let n = diesel::update(
                appointments::table
                    .filter(appointments::id.eq(id))
                    .filter(appointments::tenant_id.eq(tenant))
                    .filter(appointments::deleted_at.is_null()),
            )
            .set((
                appointments::deleted_at.eq(Some(now)),
                appointments::deleted_by.eq(Some(by.clone())),
                appointments::updated_at.eq(now),
                appointments::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "appointment {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresRepository {
    async fn insert_notification(
        &self,
        notification: &Notification,
    ) -> RepositoryResult<Notification> {
        let row = NewNotificationRow::from(notification);
        self.run("insert_notification", move |conn| {
            let stored: NotificationRow = diesel::insert_into(notifications::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Notification::from(stored))
        })
        .await
    }

    async fn update_notification(
        &self,
        notification: &Notification,
    ) -> RepositoryResult<Notification> {
        let id = notification.id.value();
        let tenant = notification.tenant_id.value();
        let changeset = NotificationChangeset::from(notification);
        self.run("update_notification", move |conn| {
            let stored: NotificationRow = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(id))
                    .filter(notifications::tenant_id.eq(tenant))
                    .filter(notifications::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            Ok(Notification::from(stored))
        })
        .await
    }

    async fn fetch_notification(
        &self,
        tenant: TenantId,
        id: NotificationId,
    ) -> RepositoryResult<Notification> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_notification", move |conn| {
            let row: NotificationRow = notifications::table
                .filter(notifications::id.eq(id))
                .filter(notifications::tenant_id.eq(tenant))
                .filter(notifications::deleted_at.is_null())
                .first(conn)?;
            Ok(Notification::from(row))
        })
        .await
    }

    async fn list_notifications(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<Notification>> {
        let tenant = tenant.value();
        self.run("list_notifications", move |conn| {
            let total: i64 = notifications::table
                .filter(notifications::tenant_id.eq(tenant))
                .filter(notifications::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<NotificationRow> = notifications::table
                .filter(notifications::tenant_id.eq(tenant))
                .filter(notifications::deleted_at.is_null())
                .order(notifications::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            Ok(ListPage::new(
                rows.into_iter().map(Notification::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn soft_delete_notification(
        &self,
        tenant: TenantId,
        id: NotificationId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_notification", move |conn| {
            let n = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(id))
                    .filter(notifications::tenant_id.eq(tenant))
                    .filter(notifications::deleted_at.is_null()),
            )
            .set((
                notifications::deleted_at.eq(Some(now)),
                notifications::deleted_by.eq(Some(by.clone())),
                notifications::updated_at.eq(now),
                notifications::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "notification {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl WebhookRepository for PostgresRepository {
    async fn insert_webhook_endpoint(
        &self,
        endpoint: &WebhookEndpoint,
    ) -> RepositoryResult<WebhookEndpoint> {
        let row = NewWebhookEndpointRow::from(endpoint);
        self.run("insert_webhook_endpoint", move |conn| {
            let stored: WebhookEndpointRow = diesel::insert_into(webhook_endpoints::table)
                .values(&row)
                .get_result(conn)?;
            WebhookEndpoint::try_from(stored)
        })
        .await
    }

    async fn update_webhook_endpoint(
        &self,
        endpoint: &WebhookEndpoint,
    ) -> RepositoryResult<WebhookEndpoint> {
        let id = endpoint.id.value();
        let tenant = endpoint.tenant_id.value();
        let changeset = WebhookEndpointChangeset::from(endpoint);
        self.run("update_webhook_endpoint", move |conn| {
            let stored: WebhookEndpointRow = diesel::update(
                webhook_endpoints::table
                    .filter(webhook_endpoints::id.eq(id))
                    .filter(webhook_endpoints::tenant_id.eq(tenant))
                    .filter(webhook_endpoints::deleted_at.is_null()),
            )
            .set(&changeset)
            .get_result(conn)?;
            WebhookEndpoint::try_from(stored)
        })
        .await
    }

    async fn fetch_webhook_endpoint(
        &self,
        tenant: TenantId,
        id: WebhookEndpointId,
    ) -> RepositoryResult<WebhookEndpoint> {
        let tenant = tenant.value();
        let id = id.value();
        self.run("fetch_webhook_endpoint", move |conn| {
            let row: WebhookEndpointRow = webhook_endpoints::table
                .filter(webhook_endpoints::id.eq(id))
                .filter(webhook_endpoints::tenant_id.eq(tenant))
                .filter(webhook_endpoints::deleted_at.is_null())
                .first(conn)?;
            WebhookEndpoint::try_from(row)
        })
        .await
    }

    async fn list_webhook_endpoints(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> RepositoryResult<ListPage<WebhookEndpoint>> {
        let tenant = tenant.value();
        self.run("list_webhook_endpoints", move |conn| {
            let total: i64 = webhook_endpoints::table
                .filter(webhook_endpoints::tenant_id.eq(tenant))
                .filter(webhook_endpoints::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            let rows: Vec<WebhookEndpointRow> = webhook_endpoints::table
                .filter(webhook_endpoints::tenant_id.eq(tenant))
                .filter(webhook_endpoints::deleted_at.is_null())
                .order(webhook_endpoints::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .load(conn)?;
            let items = rows
                .into_iter()
                .map(WebhookEndpoint::try_from)
                .collect::<RepositoryResult<Vec<_>>>()?;
            Ok(ListPage::new(items, total, page))
        })
        .await
    }

    async fn soft_delete_webhook_endpoint(
        &self,
        tenant: TenantId,
        id: WebhookEndpointId,
        deleted_by: &str,
    ) -> RepositoryResult<()> {
        let tenant = tenant.value();
        let id = id.value();
        let by = deleted_by.to_string();
        let now = chrono::Utc::now();
        self.run("soft_delete_webhook_endpoint", move |conn| {
            let n = diesel::update(
                webhook_endpoints::table
                    .filter(webhook_endpoints::id.eq(id))
                    .filter(webhook_endpoints::tenant_id.eq(tenant))
                    .filter(webhook_endpoints::deleted_at.is_null()),
            )
            .set((
                webhook_endpoints::deleted_at.eq(Some(now)),
                webhook_endpoints::deleted_by.eq(Some(by.clone())),
                webhook_endpoints::updated_at.eq(now),
                webhook_endpoints::updated_by.eq(by.clone()),
            ))
            .execute(conn)?;
            if n == 0 {
                Err(RepositoryError::not_found(format!(
                    "webhook_endpoint {} not found",
                    id
                )))
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run("health_check", move |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn active_webhook_endpoints(
        &self,
        tenant: TenantId,
        kind: EntityKind,
    ) -> RepositoryResult<Vec<WebhookEndpoint>> {
        let tenant = tenant.value();
        let endpoints = self
            .run("active_webhook_endpoints", move |conn| {
                let rows: Vec<WebhookEndpointRow> = webhook_endpoints::table
                    .filter(webhook_endpoints::tenant_id.eq(tenant))
                    .filter(webhook_endpoints::deleted_at.is_null())
                    .filter(webhook_endpoints::active.eq(true))
                    .order(webhook_endpoints::id.asc())
                    .load(conn)?;
                rows.into_iter()
                    .map(WebhookEndpoint::try_from)
                    .collect::<RepositoryResult<Vec<_>>>()
            })
            .await?;

        // Subscription filtering happens in Rust, not via jsonb containment.
        Ok(endpoints
            .into_iter()
            .filter(|e| e.subscribes_to(kind))
            .collect())
    }
}
