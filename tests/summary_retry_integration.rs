//! Integration tests for connectivity-triggered summary retry.
//!
//! Reports completed offline stay pending until the device reconnects; the
//! retry worker then regenerates the summary for the report on screen, or
//! for every pending report when the sweep is enabled.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use assessment_engine::adapters::ai::MockError;
use assessment_engine::adapters::{
    InMemoryDocumentStore, LlmSummaryGenerator, MockAIProvider, WatchConnectivityMonitor,
};
use assessment_engine::application::{
    CompleteAssessmentCommand, CompleteAssessmentHandler, ProgressGateway, ReportStore,
    ReportSummarizer, RetryOutcome, SummaryRetryWorker,
};
use assessment_engine::domain::foundation::{QuestionId, ReportId, UserId};
use assessment_engine::domain::questionnaire::{AnswerType, ResponseLedger};
use assessment_engine::domain::report::AiSummaryStatus;
use assessment_engine::domain::session::SessionMetadata;
use assessment_engine::ports::Connectivity;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct World {
    connectivity: Arc<WatchConnectivityMonitor>,
    provider: Arc<MockAIProvider>,
    reports: Arc<ReportStore>,
    completion: CompleteAssessmentHandler,
    summarizer: Arc<ReportSummarizer>,
}

impl World {
    fn new(provider: MockAIProvider) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let connectivity = Arc::new(WatchConnectivityMonitor::new(Connectivity::Offline));
        let provider = Arc::new(provider);
        let generator = Arc::new(LlmSummaryGenerator::new(provider.clone()));
        let summarizer = Arc::new(ReportSummarizer::new(connectivity.clone(), generator));
        let reports = Arc::new(ReportStore::new(store.clone()));
        let gateway = Arc::new(ProgressGateway::new(store, Duration::from_secs(5)));
        Self {
            completion: CompleteAssessmentHandler::new(
                reports.clone(),
                gateway,
                summarizer.clone(),
            ),
            connectivity,
            provider,
            reports,
            summarizer,
        }
    }

    fn worker(&self) -> SummaryRetryWorker {
        SummaryRetryWorker::new(
            user(),
            self.reports.clone(),
            self.summarizer.clone(),
            self.connectivity.clone(),
        )
    }

    /// Completes an assessment at `facility` while offline.
    async fn complete_offline(&self, facility: &str) -> ReportId {
        let ledger: ResponseLedger = [
            (QuestionId::new("q1").unwrap(), AnswerType::Compliant),
            (QuestionId::new("q2").unwrap(), AnswerType::NonCompliant),
        ]
        .into_iter()
        .collect();
        let question_texts = ledger
            .iter()
            .map(|(id, _)| (id.clone(), format!("Is {} compliant?", id)))
            .collect();
        let result = self
            .completion
            .handle(CompleteAssessmentCommand {
                user_id: user(),
                metadata: metadata(facility),
                ledger,
                question_texts,
                record_id: None,
            })
            .await
            .unwrap();
        result.cleanup.await.unwrap();
        assert!(result.report.is_summary_pending());
        result.report.id().clone()
    }

    async fn status(&self, id: &ReportId) -> AiSummaryStatus {
        self.reports
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .ai_summary_status()
    }

    async fn wait_for(&self, id: &ReportId, expected: AiSummaryStatus) -> bool {
        for _ in 0..100 {
            if self.status(id).await == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

fn user() -> UserId {
    UserId::new("inspector-7").unwrap()
}

fn metadata(facility: &str) -> SessionMetadata {
    SessionMetadata {
        domain_id: "safety".into(),
        domain_name: "Safety".into(),
        sub_domain_id: "fire-safety".into(),
        sub_domain_name: "Fire Safety".into(),
        facility_id: facility.into(),
        facility_name: format!("Facility {}", facility),
        assessment_name: "Fire Safety Audit".into(),
        is_custom_assessment: false,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn reconnecting_fills_in_displayed_summary() {
    let world = World::new(MockAIProvider::new());
    let id = world.complete_offline("plant-1").await;
    assert_eq!(world.provider.call_count(), 0);

    let worker = Arc::new(world.worker());
    worker.display(Some(id.clone()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.run(shutdown_rx).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    world.connectivity.set(Connectivity::Online);

    assert!(world.wait_for(&id, AiSummaryStatus::Completed).await);
    assert_eq!(world.provider.call_count(), 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn failed_retry_stays_pending_until_next_transition() {
    let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
    let world = World::new(provider);
    let id = world.complete_offline("plant-1").await;
    let worker = world.worker();
    worker.display(Some(id.clone()));

    world.connectivity.set(Connectivity::Online);
    assert_eq!(worker.retry_displayed().await.unwrap(), RetryOutcome::StillPending);
    assert_eq!(world.status(&id).await, AiSummaryStatus::Pending);

    world.connectivity.set(Connectivity::Offline);
    assert_eq!(worker.retry_displayed().await.unwrap(), RetryOutcome::Offline);

    world.connectivity.set(Connectivity::Online);
    assert_eq!(worker.retry_displayed().await.unwrap(), RetryOutcome::Updated);
    assert_eq!(world.status(&id).await, AiSummaryStatus::Completed);
}

#[tokio::test]
async fn undisplayed_reports_wait_unless_sweep_is_enabled() {
    let world = World::new(MockAIProvider::new());
    let shown = world.complete_offline("plant-1").await;
    let hidden = world.complete_offline("plant-2").await;
    world.connectivity.set(Connectivity::Online);

    let narrow = world.worker();
    narrow.display(Some(shown.clone()));
    narrow.handle_online().await;
    assert_eq!(world.status(&shown).await, AiSummaryStatus::Completed);
    assert_eq!(world.status(&hidden).await, AiSummaryStatus::Pending);

    let sweeping = world.worker().with_sweep_all_pending(true);
    sweeping.handle_online().await;
    assert_eq!(world.status(&hidden).await, AiSummaryStatus::Completed);
}
