// Shared helpers; not every test crate uses every helper.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use herdbook::db::repositories::LocalRepository;
use herdbook::db::repository::FullRepository;
use herdbook::events::InMemoryEventBus;
use herdbook::models::{TenantContext, TenantId};
use herdbook::services::animals::{create_animal, CreateAnimal};
use herdbook::services::customers::{create_customer, CreateCustomer};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Tenant context for tenant 1, the default test tenant.
pub fn test_ctx() -> TenantContext {
    TenantContext::new(TenantId::new(1), "api:test")
}

/// Tenant context for a second tenant, for isolation tests.
pub fn other_ctx() -> TenantContext {
    TenantContext::new(TenantId::new(2), "api:other")
}

/// Fresh in-memory repository and event bus.
pub fn repo_and_bus() -> (Arc<LocalRepository>, Arc<InMemoryEventBus>) {
    (
        Arc::new(LocalRepository::new()),
        Arc::new(InMemoryEventBus::new()),
    )
}

/// Seed a customer and return its id.
pub async fn seed_customer(
    repo: &dyn FullRepository,
    bus: &InMemoryEventBus,
    ctx: &TenantContext,
    name: &str,
) -> i64 {
    create_customer(
        repo,
        bus,
        ctx,
        CreateCustomer {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        },
    )
    .await
    .expect("seed customer")
    .id
    .value()
}

/// Seed an animal owned by `customer_id` and return its id.
pub async fn seed_animal(
    repo: &dyn FullRepository,
    bus: &InMemoryEventBus,
    ctx: &TenantContext,
    customer_id: i64,
    name: &str,
) -> i64 {
    create_animal(
        repo,
        bus,
        ctx,
        CreateAnimal {
            name: name.to_string(),
            species: "dog".to_string(),
            breed: None,
            date_of_birth: None,
            customer_id,
            notes: None,
        },
    )
    .await
    .expect("seed animal")
    .id
    .value()
}
