//! Document store port.
//!
//! Models the remote document database the app syncs with: named
//! collections of JSON documents, per-document upsert and delete, and
//! equality-filtered queries. Delivery is at-least-once, so callers make
//! writes idempotent by reusing ids.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::foundation::DomainError;

/// A stored document: a flat JSON object.
pub type Document = Map<String, Value>;

/// Field every stored document carries with its own id.
pub const ID_FIELD: &str = "id";

/// Collections used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    InProgressAssessments,
    Reports,
    Questions,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::InProgressAssessments => "in_progress_assessments",
            Collection::Reports => "reports",
            Collection::Questions => "questions",
        }
    }
}

/// Conjunction of field equality conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the single document with this id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    /// Adds a `field == value` condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// True if every condition holds for `doc`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Port for the remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates or replaces a document and returns its id.
    ///
    /// With `id == None` the store assigns a fresh id. The returned id is
    /// written into the stored document's `id` field.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(
        &self,
        collection: Collection,
        id: Option<&str>,
        fields: Document,
    ) -> Result<String, DomainError>;

    /// Returns the first document matching `filter`, if any.
    async fn get(&self, collection: Collection, filter: &Filter)
        -> Result<Option<Document>, DomainError>;

    /// Returns every document matching `filter`.
    async fn list(&self, collection: Collection, filter: &Filter)
        -> Result<Vec<Document>, DomainError>;

    /// Deletes a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn filter_matches_all_conditions() {
        let d = doc(json!({"userId": "u1", "subDomainId": "s1", "isCustomAssessment": false}));
        assert!(Filter::new().eq("userId", "u1").eq("isCustomAssessment", false).matches(&d));
        assert!(!Filter::new().eq("userId", "u1").eq("subDomainId", "s2").matches(&d));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(&Document::new()));
    }

    #[test]
    fn by_id_uses_id_field() {
        let d = doc(json!({"id": "abc"}));
        assert!(Filter::by_id("abc").matches(&d));
        assert!(!Filter::by_id("xyz").matches(&d));
    }

    #[test]
    fn document_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn DocumentStore) {}
    }
}
