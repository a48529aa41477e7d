//! Domain-event bus for mutation fan-out.
//!
//! Every successful entity mutation publishes exactly one [`DomainEvent`].
//! Consumers (search indexer, data-lake archiver, webhook dispatcher, list
//! cache) subscribe independently; the bus is a bounded broadcast channel,
//! so a slow consumer lags without blocking publishers or other consumers.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │ Service layer│    publish()       │ Search indexer   │
//! │  (mutations) │ ──────┐            ├──────────────────┤
//! └──────────────┘       │            │ Archiver         │
//!                        ▼            ├──────────────────┤
//!                  ┌──────────────┐   │ Webhook dispatch │
//!                  │  Event Bus   │──▶├──────────────────┤
//!                  └──────────────┘   │ List cache       │
//!                         subscribe() └──────────────────┘
//! ```

pub mod publisher;
pub mod subscriber;
pub mod types;

pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventFilter, Subscription};
pub use types::{DomainEvent, EventAction};

/// Maximum events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
