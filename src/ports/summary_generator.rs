//! Summary generator port.
//!
//! The summarizer is a black box to the rest of the engine: it receives the
//! answered questions of a report and returns a structured summary or an
//! error. Errors are recorded on the report, never shown as failures.

use async_trait::async_trait;

use super::AIError;
use crate::domain::foundation::{ReportId, UserId};
use crate::domain::questionnaire::AnswerType;
use crate::domain::report::{AiSummary, Report};

/// A question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub question: String,
    pub answer: AnswerType,
}

/// Everything the summarizer needs about one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub user_id: UserId,
    pub report_id: ReportId,
    pub assessment_name: String,
    pub sub_domain_name: String,
    pub facility_name: String,
    pub items: Vec<SummaryItem>,
}

impl SummaryRequest {
    /// Pairs each response with its question text. Responses without a
    /// known text are left out.
    pub fn from_report(report: &Report) -> Self {
        let texts = report.question_texts();
        let items = report
            .responses()
            .iter()
            .filter_map(|(id, answer)| {
                texts.get(id).map(|text| SummaryItem {
                    question: text.clone(),
                    answer: *answer,
                })
            })
            .collect();
        let meta = report.metadata();
        Self {
            user_id: report.user_id().clone(),
            report_id: report.id().clone(),
            assessment_name: meta.assessment_name.clone(),
            sub_domain_name: meta.sub_domain_name.clone(),
            facility_name: meta.facility_name.clone(),
            items,
        }
    }

    pub fn has_question_texts(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Why a summary could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("device is offline")]
    Offline,

    #[error("no question texts available to summarize")]
    NoQuestionTexts,

    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),

    #[error("malformed summary: {0}")]
    Malformed(String),
}

/// Port for producing AI summaries.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(&self, request: &SummaryRequest) -> Result<AiSummary, SummaryError>;
}
