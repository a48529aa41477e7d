//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (auth, CORS, compression,
//! tracing), and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth;
use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned, tenant-authenticated endpoints
    let api_v1 = Router::new()
        // Customer CRUD
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        // Animal CRUD
        .route(
            "/animals",
            get(handlers::animals::list_animals).post(handlers::animals::create_animal),
        )
        .route(
            "/animals/{id}",
            get(handlers::animals::get_animal)
                .put(handlers::animals::update_animal)
                .delete(handlers::animals::delete_animal),
        )
        // Inventory CRUD
        .route(
            "/inventory",
            get(handlers::inventory::list_inventory_items)
                .post(handlers::inventory::create_inventory_item),
        )
        .route(
            "/inventory/{id}",
            get(handlers::inventory::get_inventory_item)
                .put(handlers::inventory::update_inventory_item)
                .delete(handlers::inventory::delete_inventory_item),
        )
        // Document CRUD
        .route(
            "/documents",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/documents/{id}",
            get(handlers::documents::get_document)
                .put(handlers::documents::update_document)
                .delete(handlers::documents::delete_document),
        )
        // Appointment CRUD
        .route(
            "/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(handlers::appointments::get_appointment)
                .put(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        // Notification CRUD
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications)
                .post(handlers::notifications::create_notification),
        )
        .route(
            "/notifications/{id}",
            get(handlers::notifications::get_notification)
                .put(handlers::notifications::update_notification)
                .delete(handlers::notifications::delete_notification),
        )
        // Webhook endpoint CRUD
        .route(
            "/webhooks",
            get(handlers::webhooks::list_webhook_endpoints)
                .post(handlers::webhooks::create_webhook_endpoint),
        )
        .route(
            "/webhooks/{id}",
            get(handlers::webhooks::get_webhook_endpoint)
                .put(handlers::webhooks::update_webhook_endpoint)
                .delete(handlers::webhooks::delete_webhook_endpoint),
        )
        // Search over the event-fed index
        .route("/search", get(handlers::search::search))
        // Every /v1 route requires a resolvable bearer token.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_tenant,
        ));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Documents may carry base64 payloads.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::events::InMemoryEventBus;
    use crate::http::auth::TenantRegistry;
    use crate::http::cache::ListCache;
    use crate::search::SearchIndex;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(
            Arc::new(LocalRepository::new()),
            Arc::new(InMemoryEventBus::new()),
            Arc::new(SearchIndex::new()),
            Arc::new(TenantRegistry::new()),
            Arc::new(ListCache::default()),
        );
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
