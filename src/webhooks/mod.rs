//! Outbound webhook dispatcher.
//!
//! Listens on the event bus and POSTs the event envelope to every active
//! endpoint of the tenant that subscribes to the event's entity kind.
//! Deliveries are signed with the endpoint secret; failures are logged and
//! never retried (the receiving side can reconcile from the REST API).

use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::db::repository::FullRepository;
use crate::events::{DomainEvent, Subscription};
use crate::models::WebhookEndpoint;

/// Signature header attached to every delivery.
pub const SIGNATURE_HEADER: &str = "x-herdbook-signature";
/// Event description header, `<entity>.<action>`.
pub const EVENT_HEADER: &str = "x-herdbook-event";

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Hex SHA-256 over the endpoint secret followed by the request body.
pub fn signature(secret: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Dispatches domain events to registered webhook endpoints.
pub struct WebhookDispatcher {
    http: reqwest::Client,
    repository: Arc<dyn FullRepository>,
}

impl WebhookDispatcher {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, repository }
    }

    /// Deliver one event to all matching endpoints.
    ///
    /// Returns the number of successful deliveries.
    pub async fn dispatch(&self, event: &DomainEvent) -> usize {
        let endpoints = match self
            .repository
            .active_webhook_endpoints(event.tenant_id, event.entity)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!(error = %e, "failed to load webhook endpoints");
                return 0;
            }
        };

        if endpoints.is_empty() {
            return 0;
        }

        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize event for webhook delivery");
                return 0;
            }
        };

        let deliveries = endpoints
            .iter()
            .map(|endpoint| self.deliver(endpoint, event, &body));
        join_all(deliveries)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count()
    }

    async fn deliver(&self, endpoint: &WebhookEndpoint, event: &DomainEvent, body: &[u8]) -> bool {
        let event_name = format!("{}.{}", event.entity, event.action.as_str());
        let result = self
            .http
            .post(&endpoint.url)
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signature(&endpoint.secret, body))
            .header(EVENT_HEADER, &event_name)
            .body(body.to_vec())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(url = %endpoint.url, event = %event_name, "webhook delivered");
                true
            }
            Ok(response) => {
                warn!(
                    url = %endpoint.url,
                    event = %event_name,
                    status = %response.status(),
                    "webhook delivery rejected"
                );
                false
            }
            Err(e) => {
                warn!(url = %endpoint.url, event = %event_name, error = %e, "webhook delivery failed");
                false
            }
        }
    }
}

/// Background task draining a bus subscription into the dispatcher.
pub async fn run_webhook_dispatcher(dispatcher: WebhookDispatcher, mut subscription: Subscription) {
    info!("webhook dispatcher started");
    while let Some(event) = subscription.recv().await {
        dispatcher.dispatch(&event).await;
    }
    info!("webhook dispatcher stopped (event bus closed)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable_and_secret_dependent() {
        let body = br#"{"entity":"animal"}"#;
        let sig1 = signature("secret-a", body);
        let sig2 = signature("secret-a", body);
        let sig3 = signature("secret-b", body);
        assert_eq!(sig1, sig2);
        assert_ne!(sig1, sig3);
        assert_eq!(sig1.len(), 64);
    }
}
