//! TTL cache for list responses, shared by every list endpoint.
//!
//! Entries are keyed by `(tenant, entity kind, page, per_page)` and dropped
//! either when the TTL expires or when a mutation event for the matching
//! `(tenant, kind)` arrives on the bus.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::events::Subscription;
use crate::models::{EntityKind, PageRequest, TenantId};

/// Default time-to-live for cached list pages.
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(30);

/// Cache key for one list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListCacheKey {
    pub tenant_id: i64,
    pub kind: EntityKind,
    pub page: u32,
    pub per_page: u32,
}

impl ListCacheKey {
    pub fn new(tenant: TenantId, kind: EntityKind, page: PageRequest) -> Self {
        Self {
            tenant_id: tenant.value(),
            kind,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

struct CacheEntry {
    inserted_at: Instant,
    body: serde_json::Value,
}

/// In-process list-response cache.
pub struct ListCache {
    ttl: Duration,
    entries: RwLock<HashMap<ListCacheKey, CacheEntry>>,
}

impl ListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a cached page if present and fresh.
    pub fn get(&self, key: &ListCacheKey) -> Option<serde_json::Value> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.body.clone())
    }

    /// Store a page.
    pub fn put(&self, key: ListCacheKey, body: serde_json::Value) {
        self.entries.write().insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                body,
            },
        );
    }

    /// Drop every cached page for one `(tenant, kind)` pair.
    pub fn invalidate(&self, tenant: TenantId, kind: EntityKind) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !(key.tenant_id == tenant.value() && key.kind == kind));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(tenant = tenant.value(), kind = %kind, dropped, "list cache invalidated");
        }
    }

    /// Number of cached pages (including expired, not yet evicted ones).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ListCache {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_TTL)
    }
}

/// Background task invalidating cached pages on mutation events.
pub async fn run_cache_invalidator(cache: Arc<ListCache>, mut subscription: Subscription) {
    info!("list cache invalidator started");
    while let Some(event) = subscription.recv().await {
        cache.invalidate(event.tenant_id, event.entity);
    }
    info!("list cache invalidator stopped (event bus closed)");
}
