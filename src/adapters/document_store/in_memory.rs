//! In-memory document store.
//!
//! Backs the demo binary and the test suite. Supports injected write latency
//! and write failures so slow or failing remote stores can be simulated.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::ports::{Collection, Document, DocumentStore, Filter, ID_FIELD};

/// Document store held in process memory.
///
/// Documents keep insertion order within a collection; `get` returns the
/// earliest match.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    write_delay_ms: AtomicU64,
    fail_writes: AtomicBool,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Delays every subsequent upsert and delete by `delay`.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful upserts.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Number of successful deletes.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Number of documents currently in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    async fn before_write(&self, collection: Collection, operation: &str) -> Result<(), DomainError> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated write failure")
                .with_detail("collection", collection.name())
                .with_detail("operation", operation));
        }
        Ok(())
    }
}

fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(|v| v.as_str())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(
        &self,
        collection: Collection,
        id: Option<&str>,
        mut fields: Document,
    ) -> Result<String, DomainError> {
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        self.before_write(collection, "upsert").await?;

        fields.insert(ID_FIELD.to_string(), id.clone().into());

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        match docs.iter_mut().find(|d| document_id(d) == Some(id.as_str())) {
            Some(existing) => *existing = fields,
            None => docs.push(fields),
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);

        tracing::trace!(collection = collection.name(), id = %id, "Document upserted");
        Ok(id)
    }

    async fn get(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DomainError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DomainError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DomainError> {
        self.before_write(collection, "delete").await?;

        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(&collection) {
            docs.retain(|d| document_id(d) != Some(id));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
