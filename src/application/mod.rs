//! Application layer - orchestration between the domain and the ports.
//!
//! Persistence helpers (`ProgressGateway`, `ReportStore`) and the summary
//! policy (`ReportSummarizer`) live here; the handlers in [`handlers`] build
//! the user-facing operations on top of them.

mod documents;
pub mod handlers;
mod progress_gateway;
mod report_store;
pub(crate) mod report_summarizer;

pub use handlers::{
    AssessmentSession, CompleteAssessmentCommand, CompleteAssessmentHandler, CompletionResult,
    ReportHistoryQuery, RestoreCoordinator, RetryOutcome, SaveStatus, SessionServices,
    SummaryRetryWorker,
};
pub use progress_gateway::{PendingSave, ProgressGateway, SaveOutcome};
pub use report_store::ReportStore;
pub use report_summarizer::{ReportSummarizer, SummaryOutcome};
