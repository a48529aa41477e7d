//! Event publisher and in-memory bus implementation.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::subscriber::{EventFilter, Subscription};
use super::types::DomainEvent;
use super::DEFAULT_CHANNEL_CAPACITY;

/// Trait for publishing domain events to the bus.
///
/// The service layer emits through this interface so tests can substitute
/// their own bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: DomainEvent) -> usize;

    /// Total number of events published so far.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-node operation; a distributed deployment
/// would substitute a broker-backed implementation behind the same trait.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DomainEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(?filter, "new event subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> usize {
        let entity = event.entity;
        let action = event.action;

        // Always increment the counter (the event was attempted).
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    entity = %entity,
                    action = action.as_str(),
                    receivers = receiver_count,
                    "event published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - the event is dropped.
                warn!(
                    entity = %entity,
                    action = action.as_str(),
                    error = %e,
                    "event dropped (no receivers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventAction;
    use crate::models::{Audit, Customer, CustomerId, TenantId};

    fn event() -> DomainEvent {
        let customer = Customer {
            id: CustomerId::new(1),
            tenant_id: TenantId::new(1),
            name: "Ada".to_string(),
            email: None,
            phone: None,
            address: None,
            audit: Audit::new("test"),
        };
        DomainEvent::from_record(EventAction::Created, &customer)
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();
        let receivers = bus.publish(event()).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_subscribers() {
        let bus = InMemoryEventBus::new();

        // Subscribers must exist BEFORE publishing.
        let _sub1 = bus.subscribe(EventFilter::all());
        let _sub2 = bus.subscribe(EventFilter::all());

        let receivers = bus.publish(event()).await;
        assert_eq!(receivers, 2);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let bus = InMemoryEventBus::with_capacity(64);
        assert_eq!(bus.capacity(), 64);
    }
}
