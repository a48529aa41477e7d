//! Data-lake archiver.
//!
//! Every domain event is written as an immutable JSON snapshot to an object
//! store, keyed by tenant, entity kind, entity id and revision. Keys embed
//! the revision, so re-delivered events hit an existing key and are skipped
//! (idempotent check-then-write); deletions leave a `.deleted.json`
//! tombstone next to the snapshots.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::events::{DomainEvent, EventAction, Subscription};

#[cfg(feature = "s3-archive")]
pub mod s3;
#[cfg(feature = "s3-archive")]
pub use s3::{S3Config, S3ObjectStore};

/// Errors from object-store operations.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal object-store interface the archiver needs.
///
/// Implemented by [`MemoryObjectStore`] for tests/local development and by
/// `S3ObjectStore` (feature `s3-archive`) for real deployments.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), ArchiveError>;
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError>;
    async fn object_exists(&self, key: &str) -> Result<bool, ArchiveError>;
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ArchiveError>;
}

/// In-memory object store for tests and local development.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), ArchiveError> {
        self.objects.write().insert(key.to_string(), body);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        Ok(self.objects.read().get(key).cloned())
    }

    async fn object_exists(&self, key: &str) -> Result<bool, ArchiveError> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ArchiveError> {
        Ok(self
            .objects
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Archives domain events to an object store.
pub struct Archiver {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl Archiver {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: into_trimmed_prefix(prefix.into()),
        }
    }

    /// Object key for an event snapshot.
    pub fn key_for(&self, event: &DomainEvent) -> String {
        let suffix = match event.action {
            EventAction::Deleted => ".deleted.json",
            _ => ".json",
        };
        format!(
            "{}{}/{}/{}/{}{}",
            self.prefix,
            event.tenant_id.value(),
            event.entity,
            event.entity_id,
            event.revision.timestamp_micros(),
            suffix
        )
    }

    /// Archive one event.
    ///
    /// Returns `Ok(true)` if a snapshot was written, `Ok(false)` if the key
    /// already existed and the event was skipped.
    pub async fn archive(&self, event: &DomainEvent) -> Result<bool, ArchiveError> {
        let key = self.key_for(event);

        if self.store.object_exists(&key).await? {
            debug!(key, "snapshot already archived; skipping");
            return Ok(false);
        }

        let body = serde_json::to_vec(event)?;
        self.store.put_object(&key, body).await?;
        debug!(key, "event archived");
        Ok(true)
    }
}

fn into_trimmed_prefix(prefix: String) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Background task draining a bus subscription into the archiver.
///
/// Archive failures are logged and the task moves on; the archive is a
/// best-effort sink and must never stall the bus.
pub async fn run_archiver(archiver: Archiver, mut subscription: Subscription) {
    info!("archiver started");
    while let Some(event) = subscription.recv().await {
        if let Err(e) = archiver.archive(&event).await {
            warn!(
                entity = %event.entity,
                entity_id = event.entity_id,
                error = %e,
                "failed to archive event"
            );
        }
    }
    info!("archiver stopped (event bus closed)");
}
