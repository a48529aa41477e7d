//! Event fan-out: one event per mutation, and both consumers (search
//! indexer, archiver) converge idempotently from the same subscription.

mod support;

use std::sync::Arc;

use herdbook::archive::{Archiver, MemoryObjectStore, ObjectStore};
use herdbook::events::{EventAction, EventFilter, EventPublisher};
use herdbook::models::{AnimalId, EntityKind, TenantId};
use herdbook::search::SearchIndex;
use herdbook::services::animals::{self, UpdateAnimal};

#[tokio::test]
async fn test_one_event_per_mutation() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();
    let mut sub = bus.subscribe(EventFilter::all());

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let animal = support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;

    animals::update_animal(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        AnimalId::new(animal),
        UpdateAnimal {
            notes: Some("limping".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    animals::delete_animal(repo.as_ref(), bus.as_ref(), &ctx, AnimalId::new(animal))
        .await
        .unwrap();

    assert_eq!(bus.events_published(), 4);

    // customer created, animal created, animal updated, animal deleted
    let actions: Vec<(EntityKind, EventAction)> = [
        sub.recv().await.unwrap(),
        sub.recv().await.unwrap(),
        sub.recv().await.unwrap(),
        sub.recv().await.unwrap(),
    ]
    .into_iter()
    .map(|e| (e.entity, e.action))
    .collect();

    assert_eq!(
        actions,
        vec![
            (EntityKind::Customer, EventAction::Created),
            (EntityKind::Animal, EventAction::Created),
            (EntityKind::Animal, EventAction::Updated),
            (EntityKind::Animal, EventAction::Deleted),
        ]
    );
}

#[tokio::test]
async fn test_fanout_converges_and_replays_are_noops() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();
    let mut sub = bus.subscribe(EventFilter::all());

    let index = SearchIndex::new();
    let store = Arc::new(MemoryObjectStore::new());
    let archiver = Archiver::new(store.clone(), "lake");

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let animal = support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;
    // Keep the update's revision strictly after the create's.
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    animals::update_animal(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        AnimalId::new(animal),
        UpdateAnimal {
            name: Some("Rexford".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Drain the subscription, feeding both consumers, then replay every
    // event a second time.
    let mut events = Vec::new();
    for _ in 0..3 {
        events.push(sub.recv().await.unwrap());
    }
    for event in &events {
        index.apply(event);
        archiver.archive(event).await.unwrap();
    }
    let objects_after_first_pass = store.len();
    for event in &events {
        assert!(!index.apply(event), "replayed event must not re-apply");
        assert!(
            !archiver.archive(event).await.unwrap(),
            "replayed event must not re-archive"
        );
    }

    assert_eq!(store.len(), objects_after_first_pass);
    assert_eq!(store.len(), 3);

    // The index reflects the latest revision only.
    let hits = index.search(TenantId::new(1), "rexford", 10);
    assert_eq!(hits.len(), 1);
    assert!(index.search(TenantId::new(1), "rex", 10).len() <= 1);

    // Snapshots for the animal live under its key prefix, newest revision last.
    let keys = store
        .list_keys(&format!("lake/1/animal/{}/", animal))
        .await
        .unwrap();
    assert_eq!(keys.len(), 2);
}

#[tokio::test]
async fn test_out_of_order_delivery_keeps_newest_state() {
    let (repo, bus) = support::repo_and_bus();
    let ctx = support::test_ctx();
    let mut sub = bus.subscribe(EventFilter::all());

    let owner = support::seed_customer(repo.as_ref(), &bus, &ctx, "Ada").await;
    let animal = support::seed_animal(repo.as_ref(), &bus, &ctx, owner, "Rex").await;
    // Keep the update's revision strictly after the create's.
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    animals::update_animal(
        repo.as_ref(),
        bus.as_ref(),
        &ctx,
        AnimalId::new(animal),
        UpdateAnimal {
            name: Some("Rexford".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let mut events = Vec::new();
    for _ in 0..3 {
        events.push(sub.recv().await.unwrap());
    }

    // Deliver newest-first; the older create must not clobber the update.
    let index = SearchIndex::new();
    for event in events.iter().rev() {
        index.apply(event);
    }

    let hits = index.search(TenantId::new(1), "rexford", 10);
    assert_eq!(hits.len(), 1, "newest revision must win");
}
