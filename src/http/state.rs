//! Application state for the HTTP server.

use std::sync::Arc;

use super::auth::TenantRegistry;
use super::cache::ListCache;
use crate::db::repository::FullRepository;
use crate::events::InMemoryEventBus;
use crate::search::SearchIndex;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Domain event bus; mutations publish here
    pub bus: Arc<InMemoryEventBus>,
    /// Search index queried by `GET /v1/search`
    pub search: Arc<SearchIndex>,
    /// Bearer-token to tenant resolution
    pub tenants: Arc<TenantRegistry>,
    /// Shared cache for list responses
    pub list_cache: Arc<ListCache>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        repository: Arc<dyn FullRepository>,
        bus: Arc<InMemoryEventBus>,
        search: Arc<SearchIndex>,
        tenants: Arc<TenantRegistry>,
        list_cache: Arc<ListCache>,
    ) -> Self {
        Self {
            repository,
            bus,
            search,
            tenants,
            list_cache,
        }
    }
}
