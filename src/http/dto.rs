//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies live with their service modules and are re-exported here
//! so the HTTP surface is visible in one place. Entity responses serialize
//! the domain models directly (webhook secrets are write-only and never
//! serialized).

use serde::{Deserialize, Serialize};

pub use crate::services::animals::{CreateAnimal, UpdateAnimal};
pub use crate::services::appointments::{CreateAppointment, UpdateAppointment};
pub use crate::services::customers::{CreateCustomer, UpdateCustomer};
pub use crate::services::documents::{CreateDocument, UpdateDocument};
pub use crate::services::inventory::{CreateInventoryItem, UpdateInventoryItem};
pub use crate::services::notifications::{CreateNotification, UpdateNotification};
pub use crate::services::webhooks::{CreateWebhookEndpoint, UpdateWebhookEndpoint};

pub use crate::models::ListPage;
pub use crate::search::SearchHit;

/// Query parameters shared by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (default 25, capped at 100)
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Query parameters for the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchQuery {
    /// Search terms
    #[serde(default)]
    pub q: Option<String>,
    /// Maximum hits to return (default 20, capped at 50)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
