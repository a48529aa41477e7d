//! CRUD round-trips through the service layer: each endpoint's DTO passes
//! validation, persists, and reads back; soft delete and tenant isolation
//! hold across entities.

mod support;

use herdbook::db::repository::RepositoryError;
use herdbook::models::{
    AnimalId, AppointmentStatus, CustomerId, EntityKind, PageRequest,
};
use herdbook::services::animals::{self, UpdateAnimal};
use herdbook::services::appointments::{self, CreateAppointment, UpdateAppointment};
use herdbook::services::customers::{self, CreateCustomer, UpdateCustomer};
use herdbook::services::documents::{self, CreateDocument};
use herdbook::services::inventory::{self, CreateInventoryItem};
use herdbook::services::notifications::{self, CreateNotification, UpdateNotification};
use herdbook::services::webhooks::{self, CreateWebhookEndpoint};
use chrono::{Duration, Utc};

#[tokio::test]
async fn test_customer_round_trip() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let created = customers::create_customer(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateCustomer {
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: Some("555-0101".to_string()),
            address: None,
        },
    )
    .await
    .unwrap();

    let fetched = customers::get_customer(repo.as_ref(), &ctx, created.id)
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let updated = customers::update_customer(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        created.id,
        UpdateCustomer {
            address: Some("1 Farm Lane".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.address.as_deref(), Some("1 Farm Lane"));
    assert_eq!(updated.name, "Ada Lovelace");
    assert!(updated.audit.updated_at >= created.audit.updated_at);
    assert_eq!(updated.audit.created_at, created.audit.created_at);
}

#[tokio::test]
async fn test_animal_lifecycle_with_owner() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let animal_id = support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;

    let renamed = animals::update_animal(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        AnimalId::new(animal_id),
        UpdateAnimal {
            name: Some("Rexford".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Rexford");
    assert_eq!(renamed.customer_id.value(), owner);

    animals::delete_animal(repo.as_ref(), bus.as_ref(), &ctx, AnimalId::new(animal_id))
        .await
        .unwrap();

    let err = animals::get_animal(repo.as_ref(), &ctx, AnimalId::new(animal_id))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    // Deleted rows do not appear in lists.
    let page = animals::list_animals(repo.as_ref(), &ctx, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_tenant_isolation_across_services() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();
    let other = support::other_ctx();

    let id = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;

    // The other tenant can neither read nor delete tenant 1's row.
    assert!(
        customers::get_customer(repo.as_ref(), &other, CustomerId::new(id))
            .await
            .is_err()
    );
    assert!(
        customers::delete_customer(repo.as_ref(), bus.as_ref(), &other, CustomerId::new(id))
            .await
            .is_err()
    );

    let page = customers::list_customers(repo.as_ref(), &other, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    // And tenant 1 still sees it.
    assert!(
        customers::get_customer(repo.as_ref(), &ctx, CustomerId::new(id))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_inventory_round_trip() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let item = inventory::create_inventory_item(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateInventoryItem {
            name: "Sheep wormer".to_string(),
            sku: "WRM-17".to_string(),
            quantity: 40,
            unit: Some("bottle".to_string()),
            reorder_level: Some(10),
        },
    )
    .await
    .unwrap();

    let fetched = inventory::get_inventory_item(repo.as_ref(), &ctx, item.id)
        .await
        .unwrap();
    assert_eq!(fetched.sku, "WRM-17");
    assert_eq!(fetched.quantity, 40);
}

#[tokio::test]
async fn test_document_round_trip_preserves_checksum_invariant() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let document = documents::create_document(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateDocument {
            title: "Invoice 2026-113".to_string(),
            content_type: "text/plain".to_string(),
            content: "consultation: 45.00".to_string(),
            animal_id: None,
            customer_id: Some(owner),
        },
    )
    .await
    .unwrap();

    let fetched = documents::get_document(repo.as_ref(), &ctx, document.id)
        .await
        .unwrap();
    assert_eq!(
        fetched.checksum,
        herdbook::db::calculate_checksum(&fetched.content)
    );
    assert_eq!(fetched.customer_id.map(|id| id.value()), Some(owner));
}

#[tokio::test]
async fn test_appointment_round_trip_and_cancellation() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let animal = support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;

    let now = Utc::now();
    let appointment = appointments::create_appointment(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateAppointment {
            customer_id: owner,
            animal_id: Some(animal),
            starts_at: now + Duration::hours(1),
            ends_at: now + Duration::hours(2),
            reason: Some("vaccination".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);

    let cancelled = appointments::update_appointment(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        appointment.id,
        UpdateAppointment {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_notification_round_trip() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let notification = notifications::create_notification(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateNotification {
            recipient: "vet@clinic".to_string(),
            subject: "Appointment reminder".to_string(),
            body: "Rex at 10:00".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(!notification.read);

    let read = notifications::update_notification(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        notification.id,
        UpdateNotification {
            read: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(read.read);
}

#[tokio::test]
async fn test_webhook_endpoint_round_trip() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    let endpoint = webhooks::create_webhook_endpoint(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        CreateWebhookEndpoint {
            url: "https://example.com/hook".to_string(),
            secret: "s3cret".to_string(),
            entities: vec![EntityKind::Animal],
            active: true,
        },
    )
    .await
    .unwrap();

    let fetched = webhooks::get_webhook_endpoint(repo.as_ref(), &ctx, endpoint.id)
        .await
        .unwrap();
    assert!(fetched.subscribes_to(EntityKind::Animal));

    // The secret is write-only: it never appears in serialized output.
    let serialized = serde_json::to_value(&fetched).unwrap();
    assert!(serialized.get("secret").is_none());
}

#[tokio::test]
async fn test_pagination_caps_and_totals() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();

    for i in 0..30 {
        support::seed_customer(repo.as_ref(), &bus, &ctx, &format!("c{}", i)).await;
    }

    // Oversized per_page is clamped to the cap.
    let page = customers::list_customers(
        repo.as_ref(),
        &ctx,
        PageRequest::new(Some(1), Some(100_000)),
    )
    .await
    .unwrap();
    assert_eq!(page.per_page, 100);
    assert_eq!(page.total, 30);
    assert_eq!(page.items.len(), 30);

    let page = customers::list_customers(repo.as_ref(), &ctx, PageRequest::new(Some(2), Some(12)))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 12);
    assert_eq!(page.total, 30);

    // Out-of-range page is empty but keeps the total.
    let page = customers::list_customers(repo.as_ref(), &ctx, PageRequest::new(Some(9), Some(12)))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 30);
}
