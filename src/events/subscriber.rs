//! Event subscriptions with filtering.

use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::warn;

use super::types::{DomainEvent, EventAction};
use crate::models::EntityKind;

/// Filter describing which events a subscriber wants.
///
/// `None` for a dimension means "any".
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kinds: Option<HashSet<EntityKind>>,
    pub actions: Option<HashSet<EventAction>>,
}

impl EventFilter {
    /// Match every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match only the given entity kinds.
    pub fn kinds(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
            actions: None,
        }
    }

    /// Restrict the filter to the given actions.
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = EventAction>) -> Self {
        self.actions = Some(actions.into_iter().collect());
        self
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &DomainEvent) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&event.entity) {
                return false;
            }
        }
        if let Some(actions) = &self.actions {
            if !actions.contains(&event.action) {
                return false;
            }
        }
        true
    }
}

/// A handle receiving filtered events from the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<DomainEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<DomainEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event.
    ///
    /// Lagged receivers log the number of missed events and continue;
    /// consumers are rebuildable projections, not systems of record, so
    /// missing events under overload is survivable. Returns `None` once the
    /// bus is dropped.
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "event subscription lagged; continuing");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
