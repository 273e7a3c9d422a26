//! Report aggregate.
//!
//! A report is written once when an assessment is completed. Responses,
//! question texts and compliance counts never change afterwards; only the
//! AI summary and its status move, and only out of `Pending`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AiSummary, AiSummaryStatus, ComplianceCounts};
use crate::domain::foundation::{
    DomainError, ErrorCode, QuestionId, ReportId, StateMachine, Timestamp, UserId,
};
use crate::domain::questionnaire::{AnswerType, ResponseLedger};
use crate::domain::session::SessionMetadata;

/// Inputs for creating a report.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub id: ReportId,
    pub user_id: UserId,
    pub metadata: SessionMetadata,
    pub ledger: ResponseLedger,
    pub question_texts: BTreeMap<QuestionId, String>,
    pub ai_summary: String,
    pub ai_summary_status: AiSummaryStatus,
    pub completed_at: Timestamp,
}

/// Completed assessment report.
///
/// # Invariants
///
/// - `compliant + non_compliant + not_applicable == total_questions`
/// - `total_questions` equals the number of recorded responses
/// - Summary status only moves `Pending -> Completed | Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    id: ReportId,
    user_id: UserId,
    #[serde(flatten)]
    metadata: SessionMetadata,
    responses: BTreeMap<QuestionId, AnswerType>,
    #[serde(default)]
    question_texts: BTreeMap<QuestionId, String>,
    total_questions: usize,
    #[serde(flatten)]
    counts: ComplianceCounts,
    #[serde(default)]
    ai_summary: String,
    ai_summary_status: AiSummaryStatus,
    completed_at: Timestamp,
}

impl Report {
    /// Creates a report, deriving counts from the draft's ledger.
    pub fn from_draft(draft: ReportDraft) -> Self {
        let counts = ComplianceCounts::tally(&draft.ledger);
        Self {
            id: draft.id,
            user_id: draft.user_id,
            metadata: draft.metadata,
            total_questions: draft.ledger.len(),
            responses: draft.ledger.as_map().clone(),
            question_texts: draft.question_texts,
            counts,
            ai_summary: draft.ai_summary,
            ai_summary_status: draft.ai_summary_status,
            completed_at: draft.completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ReportId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn responses(&self) -> &BTreeMap<QuestionId, AnswerType> {
        &self.responses
    }

    pub fn question_texts(&self) -> &BTreeMap<QuestionId, String> {
        &self.question_texts
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn counts(&self) -> ComplianceCounts {
        self.counts
    }

    pub fn ai_summary(&self) -> &str {
        &self.ai_summary
    }

    pub fn ai_summary_status(&self) -> AiSummaryStatus {
        self.ai_summary_status
    }

    pub fn completed_at(&self) -> Timestamp {
        self.completed_at
    }

    pub fn is_summary_pending(&self) -> bool {
        self.ai_summary_status == AiSummaryStatus::Pending
    }

    pub fn compliance_percentage(&self) -> f64 {
        self.counts.compliance_percentage()
    }

    /// The structured summary, if one was generated and parses.
    pub fn parsed_summary(&self) -> Option<AiSummary> {
        if self.ai_summary_status != AiSummaryStatus::Completed {
            return None;
        }
        AiSummary::from_json(&self.ai_summary).ok()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records the outcome of a summary attempt.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the summary is currently pending
    ///   and `status` is `Completed` or `Failed`
    pub fn apply_summary(
        &mut self,
        text: impl Into<String>,
        status: AiSummaryStatus,
    ) -> Result<(), DomainError> {
        let next = self.ai_summary_status.transition_to(status).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("report_id", self.id.as_str())
        })?;
        self.ai_summary = text.into();
        self.ai_summary_status = next;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::report;
    use super::*;

    #[test]
    fn counts_are_derived_from_responses() {
        let r = report(
            &[
                AnswerType::Compliant,
                AnswerType::NonCompliant,
                AnswerType::NonCompliant,
                AnswerType::NotApplicable,
            ],
            AiSummaryStatus::Pending,
        );
        assert_eq!(r.total_questions(), 4);
        assert_eq!(r.counts().compliant_count, 1);
        assert_eq!(r.counts().non_compliant_count, 2);
        assert_eq!(r.counts().not_applicable_count, 1);
        assert_eq!(r.counts().total(), r.total_questions());
    }

    #[test]
    fn pending_summary_can_be_completed() {
        let mut r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);
        r.apply_summary("{\"strengths\":[\"ok\"]}", AiSummaryStatus::Completed)
            .unwrap();
        assert_eq!(r.ai_summary_status(), AiSummaryStatus::Completed);
        assert_eq!(r.parsed_summary().unwrap().strengths, vec!["ok"]);
    }

    #[test]
    fn completed_summary_cannot_change() {
        let mut r = report(&[AnswerType::Compliant], AiSummaryStatus::Completed);
        let err = r.apply_summary("again", AiSummaryStatus::Failed).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(r.ai_summary(), "");
    }

    #[test]
    fn failed_summary_has_no_parsed_form() {
        let mut r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);
        r.apply_summary("generation failed", AiSummaryStatus::Failed)
            .unwrap();
        assert!(r.parsed_summary().is_none());
    }

    #[test]
    fn document_roundtrip_keeps_counts_and_status() {
        let r = report(
            &[AnswerType::Compliant, AnswerType::NotApplicable],
            AiSummaryStatus::Pending,
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["aiSummaryStatus"], "pending");
        assert_eq!(json["compliantCount"], 1);
        assert_eq!(json["responses"]["q1"], "NOT_APPLICABLE");

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn unknown_stored_answer_is_a_data_error() {
        let r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);
        let mut json = serde_json::to_value(&r).unwrap();
        json["responses"]["q0"] = serde_json::Value::String("PARTIAL".to_string());
        assert!(serde_json::from_value::<Report>(json).is_err());
    }
}
