//! Report persistence on top of the document store.

use std::sync::Arc;

use super::documents::{decode, decode_all, encode};
use crate::domain::foundation::{DomainError, ReportId, UserId};
use crate::domain::report::{AiSummaryStatus, Report};
use crate::domain::session::SessionMetadata;
use crate::ports::{Collection, DocumentStore, Filter};

const COLLECTION: Collection = Collection::Reports;

/// Reads and writes the `reports` collection.
///
/// Report ids are generated before the first write, so every write is an
/// upsert under a known id.
pub struct ReportStore {
    store: Arc<dyn DocumentStore>,
}

impl ReportStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, report: &Report) -> Result<(), DomainError> {
        let doc = encode(COLLECTION, report)?;
        self.store
            .upsert(COLLECTION, Some(report.id().as_str()), doc)
            .await?;
        tracing::debug!(
            report_id = %report.id(),
            status = %report.ai_summary_status(),
            "Report saved"
        );
        Ok(())
    }

    /// The report already written for this user and assessment, if any.
    pub async fn find_existing(
        &self,
        user_id: &UserId,
        metadata: &SessionMetadata,
    ) -> Result<Option<Report>, DomainError> {
        let filter = Filter::new()
            .eq("userId", user_id.as_str())
            .eq("domainId", metadata.domain_id.as_str())
            .eq("subDomainId", metadata.sub_domain_id.as_str())
            .eq("facilityId", metadata.facility_id.as_str())
            .eq("assessmentName", metadata.assessment_name.as_str());
        match self.store.get(COLLECTION, &filter).await? {
            Some(doc) => decode(COLLECTION, doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, DomainError> {
        match self.store.get(COLLECTION, &Filter::by_id(id.as_str())).await? {
            Some(doc) => decode(COLLECTION, doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Report>, DomainError> {
        let docs = self
            .store
            .list(COLLECTION, &Filter::new().eq("userId", user_id.as_str()))
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    /// Reports of a user whose summary has not been generated yet.
    pub async fn list_pending_for_user(&self, user_id: &UserId) -> Result<Vec<Report>, DomainError> {
        let filter = Filter::new()
            .eq("userId", user_id.as_str())
            .eq("aiSummaryStatus", AiSummaryStatus::Pending.as_str());
        let docs = self.store.list(COLLECTION, &filter).await?;
        Ok(decode_all(COLLECTION, docs))
    }
}
