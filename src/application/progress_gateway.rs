//! Progress persistence gateway.
//!
//! Saves, finds and deletes in-progress assessment records. A save waits
//! for the store a bounded time; past that the write keeps running on its
//! own task and the caller gets a handle to collect the id later.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

use super::documents::{decode, decode_all, encode};
use crate::domain::foundation::{DomainError, ErrorCode, RecordId, UserId};
use crate::domain::progress::InProgressAssessmentRecord;
use crate::domain::session::{SessionKey, SessionMetadata};
use crate::ports::{Collection, DocumentStore, Filter};

const COLLECTION: Collection = Collection::InProgressAssessments;

/// A save whose id was not confirmed within the bound.
#[derive(Debug)]
pub struct PendingSave {
    handle: JoinHandle<Result<RecordId, DomainError>>,
}

impl PendingSave {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the write to land and returns the id it was stored under.
    pub async fn resolve(self) -> Result<RecordId, DomainError> {
        self.handle.await.map_err(join_error)?
    }
}

/// Result of [`ProgressGateway::save`].
#[derive(Debug)]
pub enum SaveOutcome {
    Confirmed(RecordId),
    Unconfirmed(PendingSave),
}

impl SaveOutcome {
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            SaveOutcome::Confirmed(id) => Some(id),
            SaveOutcome::Unconfirmed(_) => None,
        }
    }
}

/// Gateway to the `in_progress_assessments` collection.
pub struct ProgressGateway {
    store: Arc<dyn DocumentStore>,
    confirm_timeout: Duration,
}

impl ProgressGateway {
    pub fn new(store: Arc<dyn DocumentStore>, confirm_timeout: Duration) -> Self {
        Self {
            store,
            confirm_timeout,
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    /// Creates or updates the record.
    ///
    /// A record without an id first takes over the id (and creation time)
    /// of an existing record with the same uniqueness tuple, so two
    /// sessions never leave two records behind.
    pub async fn save(
        &self,
        mut record: InProgressAssessmentRecord,
    ) -> Result<SaveOutcome, DomainError> {
        if record.id.is_none() {
            if let Some(existing) = self.find_pending(&record.user_id, &record.metadata).await? {
                tracing::debug!(
                    record_id = ?existing.id,
                    sub_domain_id = %record.metadata.sub_domain_id,
                    "Reusing existing in-progress record"
                );
                record.id = existing.id;
                record.created_at = existing.created_at;
            }
        }

        let doc = encode(COLLECTION, &record)?;
        let store = Arc::clone(&self.store);
        let id = record.id.clone();
        let mut handle = tokio::spawn(async move {
            let assigned = store
                .upsert(COLLECTION, id.as_ref().map(RecordId::as_str), doc)
                .await?;
            RecordId::new(assigned)
                .map_err(|e| DomainError::new(ErrorCode::DataCorrupted, e.to_string()))
        });

        match tokio::time::timeout(self.confirm_timeout, &mut handle).await {
            Ok(joined) => {
                let id = joined.map_err(join_error)??;
                tracing::debug!(record_id = %id, "Progress saved");
                Ok(SaveOutcome::Confirmed(id))
            }
            Err(_) => {
                tracing::warn!(
                    code = %ErrorCode::SaveTimeout,
                    timeout_ms = self.confirm_timeout.as_millis() as u64,
                    sub_domain_id = %record.metadata.sub_domain_id,
                    "Save not confirmed in time, continuing in background"
                );
                Ok(SaveOutcome::Unconfirmed(PendingSave { handle }))
            }
        }
    }

    /// The user's pending record for the assessment described by `metadata`.
    ///
    /// Standard assessments match on `(subDomainId, facilityId)`; custom
    /// ones on `(subDomainId, assessmentName)`.
    pub async fn find_pending(
        &self,
        user_id: &UserId,
        metadata: &SessionMetadata,
    ) -> Result<Option<InProgressAssessmentRecord>, DomainError> {
        Ok(self.list_matching(user_id, &metadata.key()).await?.into_iter().next())
    }

    pub async fn find_by_id(
        &self,
        id: &RecordId,
    ) -> Result<Option<InProgressAssessmentRecord>, DomainError> {
        match self.store.get(COLLECTION, &Filter::by_id(id.as_str())).await? {
            Some(doc) => decode(COLLECTION, doc).map(Some),
            None => Ok(None),
        }
    }

    /// Every pending record of a user, for a "resume" list.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<InProgressAssessmentRecord>, DomainError> {
        let docs = self
            .store
            .list(COLLECTION, &Filter::new().eq("userId", user_id.as_str()))
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), DomainError> {
        self.store.delete(COLLECTION, id.as_str()).await?;
        tracing::debug!(record_id = %id, "In-progress record deleted");
        Ok(())
    }

    /// Deletes every record with the uniqueness tuple of `metadata`.
    /// Returns how many were removed.
    pub async fn delete_matching(
        &self,
        user_id: &UserId,
        metadata: &SessionMetadata,
    ) -> Result<usize, DomainError> {
        let records = self.list_matching(user_id, &metadata.key()).await?;
        let mut removed = 0;
        for id in records.iter().filter_map(|r| r.id.as_ref()) {
            self.delete(id).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn list_matching(
        &self,
        user_id: &UserId,
        key: &SessionKey,
    ) -> Result<Vec<InProgressAssessmentRecord>, DomainError> {
        let docs = self
            .store
            .list(COLLECTION, &pending_filter(user_id, key))
            .await?;
        let records: Vec<InProgressAssessmentRecord> = decode_all(COLLECTION, docs);
        Ok(records
            .into_iter()
            .filter(|r| r.matches(user_id, key))
            .collect())
    }
}

fn pending_filter(user_id: &UserId, key: &SessionKey) -> Filter {
    let filter = Filter::new()
        .eq("userId", user_id.as_str())
        .eq("subDomainId", key.sub_domain_id());
    match key {
        SessionKey::Standard { facility_id, .. } => filter
            .eq("facilityId", facility_id.as_str())
            .eq("isCustomAssessment", false),
        SessionKey::Custom {
            assessment_name, ..
        } => filter
            .eq("assessmentName", assessment_name.as_str())
            .eq("isCustomAssessment", true),
    }
}

fn join_error(err: JoinError) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("save task failed: {}", err))
}
