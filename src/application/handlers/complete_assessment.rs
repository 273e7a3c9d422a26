//! CompleteAssessmentHandler - turns a finished session into a report.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::{ProgressGateway, ReportStore, ReportSummarizer};
use crate::domain::foundation::{QuestionId, RecordId, ReportId, Timestamp, UserId};
use crate::domain::questionnaire::ResponseLedger;
use crate::domain::report::{AiSummaryStatus, Report, ReportDraft};
use crate::domain::session::{SessionError, SessionMetadata};

/// Command to complete an assessment.
#[derive(Debug, Clone)]
pub struct CompleteAssessmentCommand {
    pub user_id: UserId,
    pub metadata: SessionMetadata,
    pub ledger: ResponseLedger,
    pub question_texts: BTreeMap<QuestionId, String>,
    /// Id of the session's in-progress record, if it has one.
    pub record_id: Option<RecordId>,
}

/// Result of a completion.
#[derive(Debug)]
pub struct CompletionResult {
    pub report: Report,
    /// True when an earlier report for the same assessment was returned or
    /// overwritten instead of creating a new one.
    pub reused_existing: bool,
    /// Background removal of the in-progress record.
    pub cleanup: JoinHandle<()>,
}

/// Handler for completing assessments.
pub struct CompleteAssessmentHandler {
    reports: Arc<ReportStore>,
    gateway: Arc<ProgressGateway>,
    summarizer: Arc<ReportSummarizer>,
}

impl CompleteAssessmentHandler {
    pub fn new(
        reports: Arc<ReportStore>,
        gateway: Arc<ProgressGateway>,
        summarizer: Arc<ReportSummarizer>,
    ) -> Self {
        Self {
            reports,
            gateway,
            summarizer,
        }
    }

    pub async fn handle(&self, cmd: CompleteAssessmentCommand) -> Result<CompletionResult, SessionError> {
        if cmd.ledger.is_empty() {
            return Err(SessionError::NotReadyToComplete);
        }

        // 1. Duplicate guard
        let existing = self.reports.find_existing(&cmd.user_id, &cmd.metadata).await?;
        let (report, reused_existing) = match existing {
            Some(report) if report.ai_summary_status() == AiSummaryStatus::Completed => {
                tracing::info!(report_id = %report.id(), "Report already completed, returning it");
                (report, true)
            }
            Some(report) if report.is_summary_pending() && !self.summarizer.is_online() => {
                tracing::info!(report_id = %report.id(), "Pending report exists and device is offline, returning it");
                (report, true)
            }
            existing => {
                let reused = existing.is_some();
                let (id, completed_at) = existing
                    .map(|r| (r.id().clone(), r.completed_at()))
                    .unwrap_or_else(|| (ReportId::generate(), Timestamp::now()));

                // 2. Snapshot the ledger
                let mut report = Report::from_draft(ReportDraft {
                    id,
                    user_id: cmd.user_id.clone(),
                    metadata: cmd.metadata.clone(),
                    ledger: cmd.ledger,
                    question_texts: cmd.question_texts,
                    ai_summary: String::new(),
                    ai_summary_status: AiSummaryStatus::Pending,
                    completed_at,
                });

                // 3. Summary, never fatal
                self.summarizer.summarize(&mut report).await?;

                // 4. Persist
                self.reports.save(&report).await?;
                tracing::info!(
                    report_id = %report.id(),
                    total = report.total_questions(),
                    status = %report.ai_summary_status(),
                    "Assessment completed"
                );
                (report, reused)
            }
        };

        // 5. Remove the in-progress record
        let cleanup = self.spawn_cleanup(cmd.user_id, cmd.metadata, cmd.record_id);

        Ok(CompletionResult {
            report,
            reused_existing,
            cleanup,
        })
    }

    fn spawn_cleanup(
        &self,
        user_id: UserId,
        metadata: SessionMetadata,
        record_id: Option<RecordId>,
    ) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Some(id) = &record_id {
                if let Err(err) = gateway.delete(id).await {
                    tracing::warn!(record_id = %id, error = %err, "Failed to delete in-progress record");
                }
            }
            match gateway.delete_matching(&user_id, &metadata).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(removed, "Removed in-progress records by lookup");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to delete in-progress records by lookup");
                }
            }
        })
    }
}
