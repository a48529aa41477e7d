//! # Herdbook Backend
//!
//! Multi-tenant REST backend for animal-care businesses.
//!
//! This crate provides the Herdbook SaaS backend: CRUD operations over the
//! core business entities (animals, customers, inventory, documents,
//! appointments, notifications, webhook endpoints) persisted through a
//! repository layer, plus a domain-event bus that fans mutations out to a
//! search indexer, a data-lake archiver and a webhook dispatcher. The
//! backend exposes a REST API via Axum.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain entities, audit fields and pagination types
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`events`]: Domain-event bus (publish on mutation, broadcast fan-out)
//! - [`search`]: In-process search index fed from the event bus
//! - [`archive`]: Data-lake archiver writing snapshots to an object store
//! - [`webhooks`]: Outbound webhook dispatcher
//! - [`services`]: High-level business logic used by the HTTP handlers
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod archive;
pub mod db;
pub mod events;
pub mod models;
pub mod search;
pub mod services;
pub mod webhooks;

#[cfg(feature = "http-server")]
pub mod http;
