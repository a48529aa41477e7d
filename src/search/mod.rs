//! In-process search index fed from the event bus.
//!
//! The indexer is a projection of the entity store: every mutation event
//! upserts (or removes) one search document. Events carry the entity's
//! `updated_at` as a revision, and [`SearchIndex::apply`] ignores anything
//! at or below the revision it already holds, so replayed or reordered
//! events cannot regress the index.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::events::{DomainEvent, EventAction, Subscription};
use crate::models::{EntityKind, TenantId};
use std::sync::Arc;

/// Key identifying one search document.
type DocKey = (i64, EntityKind, i64);

/// A single search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub entity: EntityKind,
    pub entity_id: i64,
    /// Number of query terms the document matched.
    pub score: usize,
    /// Revision of the indexed snapshot.
    pub revision: DateTime<Utc>,
}

struct IndexedDoc {
    revision: DateTime<Utc>,
    terms: HashSet<String>,
    /// Tombstone left behind by a delete; guards against a stale upsert
    /// resurrecting the document.
    deleted: bool,
}

#[derive(Default)]
struct IndexInner {
    docs: HashMap<DocKey, IndexedDoc>,
    postings: HashMap<String, HashSet<DocKey>>,
}

/// Tenant-scoped inverted index over entity payloads.
#[derive(Default)]
pub struct SearchIndex {
    inner: RwLock<IndexInner>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to the index.
    ///
    /// Returns `true` if the index changed, `false` if the event was stale
    /// or a duplicate (idempotent check-then-write).
    pub fn apply(&self, event: &DomainEvent) -> bool {
        let key = event.key();
        let mut inner = self.inner.write();

        if let Some(existing) = inner.docs.get(&key) {
            if existing.revision >= event.revision {
                debug!(
                    entity = %event.entity,
                    entity_id = event.entity_id,
                    "skipping stale or duplicate event"
                );
                return false;
            }
        }

        // Drop the previous postings for this document, if any.
        if let Some(previous) = inner.docs.remove(&key) {
            for term in &previous.terms {
                if let Some(keys) = inner.postings.get_mut(term) {
                    keys.remove(&key);
                    if keys.is_empty() {
                        inner.postings.remove(term);
                    }
                }
            }
        }

        match event.action {
            EventAction::Deleted => {
                inner.docs.insert(
                    key,
                    IndexedDoc {
                        revision: event.revision,
                        terms: HashSet::new(),
                        deleted: true,
                    },
                );
            }
            EventAction::Created | EventAction::Updated => {
                let mut terms = HashSet::new();
                collect_terms(&event.payload, &mut terms);
                for term in &terms {
                    inner
                        .postings
                        .entry(term.clone())
                        .or_default()
                        .insert(key);
                }
                inner.docs.insert(
                    key,
                    IndexedDoc {
                        revision: event.revision,
                        terms,
                        deleted: false,
                    },
                );
            }
        }
        true
    }

    /// Search a tenant's documents.
    ///
    /// Scores by the number of query terms matched; ties break on recency.
    pub fn search(&self, tenant: TenantId, query: &str, limit: usize) -> Vec<SearchHit> {
        let terms: Vec<String> = tokenize(query).collect();
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let inner = self.inner.read();
        let mut scores: HashMap<DocKey, usize> = HashMap::new();
        for term in &terms {
            if let Some(keys) = inner.postings.get(term) {
                for key in keys {
                    if key.0 == tenant.value() {
                        *scores.entry(*key).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter_map(|(key, score)| {
                let doc = inner.docs.get(&key)?;
                if doc.deleted {
                    return None;
                }
                Some(SearchHit {
                    entity: key.1,
                    entity_id: key.2,
                    score,
                    revision: doc.revision,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.revision.cmp(&a.revision))
                .then(a.entity_id.cmp(&b.entity_id))
        });
        hits.truncate(limit);
        hits
    }

    /// Number of live (non-tombstone) documents in the index.
    pub fn doc_count(&self) -> usize {
        self.inner.read().docs.values().filter(|d| !d.deleted).count()
    }
}

/// Lowercased alphanumeric tokens, minimum two characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_lowercase())
}

/// Recursively collect searchable terms from string fields of a payload.
///
/// `secret` and `checksum` fields are never indexed.
fn collect_terms(value: &serde_json::Value, out: &mut HashSet<String>) {
    match value {
        serde_json::Value::String(s) => out.extend(tokenize(s)),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_terms(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for (field, item) in map {
                if field == "secret" || field == "checksum" {
                    continue;
                }
                collect_terms(item, out);
            }
        }
        _ => {}
    }
}

/// Background task driving the index from a bus subscription.
///
/// Runs until the bus is dropped.
pub async fn run_search_indexer(index: Arc<SearchIndex>, mut subscription: Subscription) {
    info!("search indexer started");
    while let Some(event) = subscription.recv().await {
        index.apply(&event);
    }
    info!("search indexer stopped (event bus closed)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Animal, AnimalId, Audit, CustomerId};

    fn animal(name: &str) -> Animal {
        Animal {
            id: AnimalId::new(10),
            tenant_id: TenantId::new(1),
            name: name.to_string(),
            species: "dog".to_string(),
            breed: Some("border collie".to_string()),
            date_of_birth: None,
            customer_id: CustomerId::new(1),
            notes: None,
            audit: Audit::new("test"),
        }
    }

    #[test]
    fn test_apply_and_search() {
        let index = SearchIndex::new();
        let event = DomainEvent::from_record(EventAction::Created, &animal("Rex"));
        assert!(index.apply(&event));

        let hits = index.search(TenantId::new(1), "rex", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, EntityKind::Animal);
        assert_eq!(hits[0].entity_id, 10);

        // Multi-term queries score higher on better matches.
        let hits = index.search(TenantId::new(1), "rex collie", 10);
        assert_eq!(hits[0].score, 2);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let index = SearchIndex::new();
        let event = DomainEvent::from_record(EventAction::Created, &animal("Rex"));
        assert!(index.apply(&event));
        assert!(!index.apply(&event));
        assert_eq!(index.doc_count(), 1);
    }

    #[test]
    fn test_stale_event_cannot_regress_index() {
        let index = SearchIndex::new();
        let mut old = animal("Rex");
        let mut newer = old.clone();
        newer.name = "Max".to_string();
        newer.audit.touch("test");
        // Keep revisions strictly ordered even on coarse clocks.
        newer.audit.updated_at = old.audit.updated_at + chrono::Duration::seconds(1);

        index.apply(&DomainEvent::from_record(EventAction::Updated, &newer));
        old.audit.updated_at = newer.audit.updated_at - chrono::Duration::seconds(1);
        let applied = index.apply(&DomainEvent::from_record(EventAction::Updated, &old));
        assert!(!applied);

        assert!(index.search(TenantId::new(1), "max", 10).len() == 1);
        assert!(index.search(TenantId::new(1), "rex", 10).is_empty());
    }

    #[test]
    fn test_delete_removes_from_results() {
        let index = SearchIndex::new();
        let mut record = animal("Rex");
        index.apply(&DomainEvent::from_record(EventAction::Created, &record));

        record.audit.updated_at = record.audit.updated_at + chrono::Duration::seconds(1);
        index.apply(&DomainEvent::from_record(EventAction::Deleted, &record));

        assert!(index.search(TenantId::new(1), "rex", 10).is_empty());
        assert_eq!(index.doc_count(), 0);
    }

    #[test]
    fn test_tenant_scoping() {
        let index = SearchIndex::new();
        index.apply(&DomainEvent::from_record(EventAction::Created, &animal("Rex")));
        assert!(index.search(TenantId::new(2), "rex", 10).is_empty());
    }

    #[test]
    fn test_secret_fields_are_not_indexed() {
        let index = SearchIndex::new();
        let mut event = DomainEvent::from_record(EventAction::Created, &animal("Rex"));
        event.payload["secret"] = serde_json::json!("hunter2secret");
        index.apply(&event);
        assert!(index.search(TenantId::new(1), "hunter2secret", 10).is_empty());
    }
}
