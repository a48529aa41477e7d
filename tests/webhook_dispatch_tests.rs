//! Webhook dispatch: endpoint selection, signed deliveries, and payload
//! contents, verified against a mock HTTP receiver.

mod support;

use httpmock::prelude::*;

use herdbook::events::EventFilter;
use herdbook::models::EntityKind;
use herdbook::services::webhooks::{create_webhook_endpoint, CreateWebhookEndpoint};
use herdbook::webhooks::{signature, WebhookDispatcher, EVENT_HEADER, SIGNATURE_HEADER};

const SECRET: &str = "whsec_test";

async fn register_endpoint(
    repo: &herdbook::db::repositories::LocalRepository,
    bus: &herdbook::events::InMemoryEventBus,
    ctx: &herdbook::models::TenantContext,
    url: String,
    entities: Vec<EntityKind>,
    active: bool,
) {
    create_webhook_endpoint(
        repo,
        bus,
        ctx,
        CreateWebhookEndpoint {
            url,
            secret: SECRET.to_string(),
            entities,
            active,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delivery_is_signed_and_described() {
    let server = MockServer::start_async().await;
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    register_endpoint(
        &repo,
        &bus,
        &ctx,
        server.url("/hook"),
        vec![EntityKind::Animal],
        true,
    )
    .await;

    // Capture the animal-created event off the bus, then dispatch it.
    let mut sub = bus.subscribe(EventFilter::kinds([EntityKind::Animal]));
    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;
    let event = sub.recv().await.unwrap();

    let body = serde_json::to_vec(&event).unwrap();
    let expected_signature = signature(SECRET, &body);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .header(EVENT_HEADER, "animal.created")
                .header(SIGNATURE_HEADER, &expected_signature);
            then.status(200);
        })
        .await;

    let dispatcher = WebhookDispatcher::new(repo.clone());
    let delivered = dispatcher.dispatch(&event).await;

    assert_eq!(delivered, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_endpoint_selection() {
    let server = MockServer::start_async().await;
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    // Subscribed to customers only; must not receive animal events.
    register_endpoint(
        &repo,
        &bus,
        &ctx,
        server.url("/customers-only"),
        vec![EntityKind::Customer],
        true,
    )
    .await;
    // Subscribed to animals but inactive; must not receive anything.
    register_endpoint(
        &repo,
        &bus,
        &ctx,
        server.url("/inactive"),
        vec![EntityKind::Animal],
        false,
    )
    .await;

    let customers_only = server
        .mock_async(|when, then| {
            when.method(POST).path("/customers-only");
            then.status(200);
        })
        .await;
    let inactive = server
        .mock_async(|when, then| {
            when.method(POST).path("/inactive");
            then.status(200);
        })
        .await;

    let mut sub = bus.subscribe(EventFilter::kinds([EntityKind::Animal]));
    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;
    let event = sub.recv().await.unwrap();

    let dispatcher = WebhookDispatcher::new(repo.clone());
    let delivered = dispatcher.dispatch(&event).await;

    assert_eq!(delivered, 0);
    customers_only.assert_hits_async(0).await;
    inactive.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_failed_delivery_is_not_counted() {
    let server = MockServer::start_async().await;
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    register_endpoint(
        &repo,
        &bus,
        &ctx,
        server.url("/broken"),
        vec![EntityKind::Customer],
        true,
    )
    .await;

    let broken = server
        .mock_async(|when, then| {
            when.method(POST).path("/broken");
            then.status(500);
        })
        .await;

    let mut sub = bus.subscribe(EventFilter::kinds([EntityKind::Customer]));
    support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let event = sub.recv().await.unwrap();

    let dispatcher = WebhookDispatcher::new(repo.clone());
    let delivered = dispatcher.dispatch(&event).await;

    // The receiver was called but the delivery failed.
    assert_eq!(delivered, 0);
    broken.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_webhook_payload_omits_secrets() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let mut sub = bus.subscribe(EventFilter::kinds([EntityKind::WebhookEndpoint]));
    register_endpoint(
        &repo,
        &bus,
        &ctx,
        "https://example.com/hook".to_string(),
        vec![EntityKind::Animal],
        true,
    )
    .await;
    let event = sub.recv().await.unwrap();

    // Even the webhook_endpoint.created event payload must not leak the secret.
    assert!(event.payload.get("secret").is_none());
    assert_eq!(event.payload["url"], "https://example.com/hook");
}
