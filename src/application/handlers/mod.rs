//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod assessment_session;
mod complete_assessment;
mod report_history;
mod restore_coordinator;
mod summary_retry;

pub use assessment_session::{AssessmentSession, SaveStatus, SessionServices};
pub use complete_assessment::{
    CompleteAssessmentCommand, CompleteAssessmentHandler, CompletionResult,
};
pub use report_history::ReportHistoryQuery;
pub use restore_coordinator::RestoreCoordinator;
pub use summary_retry::{RetryOutcome, SummaryRetryWorker};
