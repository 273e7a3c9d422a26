//! Connectivity-aware AI summary generation for reports.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::report::{AiSummary, AiSummaryStatus, Report};
use crate::ports::{ConnectivityObserver, SummaryError, SummaryGenerator, SummaryRequest};

/// What happened when a summary was requested.
#[derive(Debug)]
pub enum SummaryOutcome {
    /// Device offline; nothing was attempted.
    Offline,
    Generated(AiSummary),
    Failed(SummaryError),
}

/// Requests summaries only while online and never lets a generator
/// failure escape.
pub struct ReportSummarizer {
    connectivity: Arc<dyn ConnectivityObserver>,
    generator: Arc<dyn SummaryGenerator>,
}

impl ReportSummarizer {
    pub fn new(
        connectivity: Arc<dyn ConnectivityObserver>,
        generator: Arc<dyn SummaryGenerator>,
    ) -> Self {
        Self {
            connectivity,
            generator,
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_currently_online()
    }

    /// Generates a summary for `report` without modifying it.
    pub async fn attempt(&self, report: &Report) -> SummaryOutcome {
        if !self.is_online() {
            return SummaryOutcome::Offline;
        }
        let request = SummaryRequest::from_report(report);
        if !request.has_question_texts() {
            return SummaryOutcome::Failed(SummaryError::NoQuestionTexts);
        }
        match self.generator.generate(&request).await {
            Ok(summary) => SummaryOutcome::Generated(summary),
            Err(err) => {
                tracing::warn!(report_id = %report.id(), error = %err, "Summary generation failed");
                SummaryOutcome::Failed(err)
            }
        }
    }

    /// Fills in the summary of a freshly completed report.
    ///
    /// Offline leaves it pending; a failure is recorded as `failed` with a
    /// diagnostic in place of the summary. Returns the resulting status.
    pub async fn summarize(&self, report: &mut Report) -> Result<AiSummaryStatus, DomainError> {
        match self.attempt(report).await {
            SummaryOutcome::Offline => {
                tracing::info!(report_id = %report.id(), "Offline, summary deferred");
            }
            SummaryOutcome::Generated(summary) => apply_generated(report, &summary)?,
            SummaryOutcome::Failed(err) => {
                report.apply_summary(failure_text(&err), AiSummaryStatus::Failed)?;
            }
        }
        Ok(report.ai_summary_status())
    }
}

/// Stores a generated summary and marks it completed.
pub(crate) fn apply_generated(report: &mut Report, summary: &AiSummary) -> Result<(), DomainError> {
    let text = summary
        .to_json()
        .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;
    report.apply_summary(text, AiSummaryStatus::Completed)
}

pub(crate) fn failure_text(err: &SummaryError) -> String {
    format!(
        "AI summary generation failed: {}. Manual review recommended.",
        err
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::watch;

    use crate::domain::report::SummaryIssue;
    use crate::ports::{AIError, Connectivity};

    pub struct FixedConnectivity {
        tx: watch::Sender<Connectivity>,
    }

    impl FixedConnectivity {
        pub fn new(online: bool) -> Self {
            let state = if online {
                Connectivity::Online
            } else {
                Connectivity::Offline
            };
            let (tx, _rx) = watch::channel(state);
            Self { tx }
        }
    }

    impl ConnectivityObserver for FixedConnectivity {
        fn is_currently_online(&self) -> bool {
            self.tx.borrow().is_online()
        }

        fn subscribe(&self) -> watch::Receiver<Connectivity> {
            self.tx.subscribe()
        }
    }

    pub struct StubGenerator {
        fail: AtomicBool,
        calls: AtomicUsize,
        requests: Mutex<Vec<SummaryRequest>>,
    }

    impl StubGenerator {
        pub fn succeeding() -> Self {
            Self {
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            let stub = Self::succeeding();
            stub.fail.store(true, Ordering::SeqCst);
            stub
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<SummaryRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    pub fn sample_summary() -> AiSummary {
        AiSummary {
            strengths: vec!["Exits are marked".into()],
            issues: vec![SummaryIssue {
                area: "Storage".into(),
                problem: "Blocked extinguisher".into(),
                ..SummaryIssue::default()
            }],
            next_steps: vec!["Re-inspect in 30 days".into()],
        }
    }

    #[async_trait]
    impl SummaryGenerator for StubGenerator {
        async fn generate(&self, request: &SummaryRequest) -> Result<AiSummary, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(AIError::unavailable("model overloaded").into());
            }
            Ok(sample_summary())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::foundation::{ReportId, Timestamp, UserId};
    use crate::domain::questionnaire::{AnswerType, ResponseLedger};
    use crate::domain::report::aggregate_fixtures::report;
    use crate::domain::report::ReportDraft;
    use crate::domain::session::fixtures;
    use std::collections::BTreeMap;

    fn summarizer(online: bool, generator: Arc<StubGenerator>) -> ReportSummarizer {
        ReportSummarizer::new(Arc::new(FixedConnectivity::new(online)), generator)
    }

    #[tokio::test]
    async fn offline_leaves_report_pending_without_calling() {
        let generator = Arc::new(StubGenerator::succeeding());
        let mut r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);

        let status = summarizer(false, generator.clone()).summarize(&mut r).await.unwrap();

        assert_eq!(status, AiSummaryStatus::Pending);
        assert_eq!(r.ai_summary(), "");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn online_success_stores_json_summary() {
        let generator = Arc::new(StubGenerator::succeeding());
        let mut r = report(&[AnswerType::NonCompliant], AiSummaryStatus::Pending);

        let status = summarizer(true, generator.clone()).summarize(&mut r).await.unwrap();

        assert_eq!(status, AiSummaryStatus::Completed);
        assert_eq!(r.parsed_summary(), Some(sample_summary()));
        assert_eq!(generator.requests()[0].items.len(), 1);
    }

    #[tokio::test]
    async fn online_failure_records_diagnostic() {
        let generator = Arc::new(StubGenerator::failing());
        let mut r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);

        let status = summarizer(true, generator).summarize(&mut r).await.unwrap();

        assert_eq!(status, AiSummaryStatus::Failed);
        assert!(r.ai_summary().starts_with("AI summary generation failed:"));
        assert!(r.ai_summary().ends_with("Manual review recommended."));
    }

    #[tokio::test]
    async fn missing_question_texts_fail_without_calling() {
        let generator = Arc::new(StubGenerator::succeeding());
        let ledger: ResponseLedger = [(
            crate::domain::foundation::QuestionId::new("q1").unwrap(),
            AnswerType::Compliant,
        )]
        .into_iter()
        .collect();
        let mut r = Report::from_draft(ReportDraft {
            id: ReportId::generate(),
            user_id: UserId::new("user-1").unwrap(),
            metadata: fixtures::fire_safety(),
            ledger,
            question_texts: BTreeMap::new(),
            ai_summary: String::new(),
            ai_summary_status: AiSummaryStatus::Pending,
            completed_at: Timestamp::now(),
        });

        let status = summarizer(true, generator.clone()).summarize(&mut r).await.unwrap();

        assert_eq!(status, AiSummaryStatus::Failed);
        assert!(r.ai_summary().contains("no question texts"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn attempt_does_not_modify_report() {
        let generator = Arc::new(StubGenerator::failing());
        let r = report(&[AnswerType::Compliant], AiSummaryStatus::Pending);

        let outcome = summarizer(true, generator).attempt(&r).await;

        assert!(matches!(outcome, SummaryOutcome::Failed(SummaryError::Provider(_))));
        assert!(r.is_summary_pending());
    }
}
