//! assessment-engine - runs one assessment end to end against in-memory
//! adapters.
//!
//! Answers part of a questionnaire, saves and exits, resumes in a fresh
//! session, completes offline and lets the retry worker fill in the AI
//! summary once connectivity returns.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use assessment_engine::adapters::{
    CachedQuestionSource, InMemoryDocumentStore, LlmSummaryGenerator, MockAIProvider,
    OpenAIProvider, StoreQuestionSource, WatchConnectivityMonitor,
};
use assessment_engine::application::{
    AssessmentSession, CompleteAssessmentHandler, ProgressGateway, ReportHistoryQuery,
    ReportStore, ReportSummarizer, SessionServices, SummaryRetryWorker,
};
use assessment_engine::config::AppConfig;
use assessment_engine::domain::foundation::UserId;
use assessment_engine::domain::questionnaire::AnswerType;
use assessment_engine::domain::session::SessionMetadata;
use assessment_engine::ports::{AIProvider, Collection, Connectivity, DocumentStore};
use assessment_engine::telemetry;

const QUESTIONS: [&str; 5] = [
    "Are all emergency exits clearly marked and unobstructed?",
    "Are fire extinguishers inspected monthly?",
    "Is the fire alarm tested weekly?",
    "Are evacuation drills held at least twice a year?",
    "Is flammable storage kept away from ignition sources?",
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    telemetry::init(&config.logging).context("installing tracing subscriber")?;

    info!(
        "Starting assessment-engine v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Adapters
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_questions(store.as_ref(), "fire-safety").await?;

    let connectivity = Arc::new(WatchConnectivityMonitor::new(Connectivity::Offline));
    let provider: Arc<dyn AIProvider> = match config.ai.openai_config() {
        Some(openai) => {
            info!(model = %openai.model, "Using OpenAI-compatible provider");
            Arc::new(OpenAIProvider::new(openai).context("building AI provider")?)
        }
        None => {
            info!("No API key configured, using mock AI provider");
            Arc::new(MockAIProvider::new())
        }
    };
    let generator =
        Arc::new(LlmSummaryGenerator::new(provider).with_settings(config.ai.summary_settings()));

    // Application services
    let gateway = Arc::new(ProgressGateway::new(
        store.clone(),
        config.persistence.save_confirm_timeout(),
    ));
    let reports = Arc::new(ReportStore::new(store.clone()));
    let summarizer = Arc::new(ReportSummarizer::new(connectivity.clone(), generator));
    let services = SessionServices {
        questions: Arc::new(CachedQuestionSource::new(Arc::new(StoreQuestionSource::new(
            store.clone(),
        )))),
        gateway: gateway.clone(),
        completion: Arc::new(CompleteAssessmentHandler::new(
            reports.clone(),
            gateway.clone(),
            summarizer.clone(),
        )),
        autosave: config.persistence.autosave,
    };

    let user_id = UserId::new("demo-user")?;
    let metadata = SessionMetadata {
        domain_id: "safety".into(),
        domain_name: "Safety".into(),
        sub_domain_id: "fire-safety".into(),
        sub_domain_name: "Fire Safety".into(),
        facility_id: "plant-1".into(),
        facility_name: "Main Plant".into(),
        assessment_name: "Quarterly Fire Safety Audit".into(),
        is_custom_assessment: false,
    };

    // First visit: answer two questions, then save and exit.
    let mut session = AssessmentSession::new(user_id.clone(), metadata.clone(), services.clone())?;
    session.load_questions().await?;
    session.answer_current(AnswerType::Compliant).await?;
    session.next_question().await;
    session.answer_current(AnswerType::NonCompliant).await?;
    session.next_question().await;
    let saved = session.save_progress().await?;
    info!(?saved, "Progress saved, leaving the assessment");
    session.discard();

    // Second visit: resume where the user left off.
    let mut session = AssessmentSession::new(user_id.clone(), metadata, services)?;
    session.load_questions().await?;
    let restored = session.discover_pending().await?;
    info!(
        ?restored,
        index = session.controller().current_index(),
        answered = session.controller().ledger().len(),
        "Resumed assessment"
    );

    let answers = [
        AnswerType::Compliant,
        AnswerType::NotApplicable,
        AnswerType::NonCompliant,
    ];
    for answer in answers {
        session.answer_current(answer).await?;
        if !session.next_question().await {
            break;
        }
    }

    // Complete while offline; the summary stays pending.
    let completion = session.complete().await?;
    completion
        .cleanup
        .await
        .context("removing in-progress record")?;
    let report = completion.report;
    let counts = report.counts();
    info!(
        report_id = %report.id(),
        compliant = counts.compliant_count,
        non_compliant = counts.non_compliant_count,
        not_applicable = counts.not_applicable_count,
        compliance_pct = report.compliance_percentage(),
        status = %report.ai_summary_status(),
        "Report created"
    );

    // Come back online with the report on screen.
    let worker = Arc::new(
        SummaryRetryWorker::new(
            user_id.clone(),
            reports.clone(),
            summarizer,
            connectivity.clone(),
        )
        .with_sweep_all_pending(config.retry.sweep_all_pending),
    );
    worker.display(Some(report.id().clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.run(shutdown_rx).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    connectivity.set(Connectivity::Online);

    let mut updated = None;
    for _ in 0..100 {
        match reports.find_by_id(report.id()).await? {
            Some(r) if !r.is_summary_pending() => {
                updated = Some(r);
                break;
            }
            _ => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }

    shutdown_tx.send(true).ok();
    worker_task.await.context("joining retry worker")?;

    match updated.as_ref().and_then(|r| r.parsed_summary()) {
        Some(summary) => {
            for strength in &summary.strengths {
                info!(%strength, "Summary strength");
            }
            for step in &summary.next_steps {
                info!(%step, "Summary next step");
            }
        }
        None => info!("Summary still pending"),
    }

    let history = ReportHistoryQuery::new(reports, config.history.week_start)
        .handle(&user_id)
        .await?;
    for bucket in &history {
        info!(label = %bucket.label, reports = bucket.reports.len(), "History bucket");
    }

    Ok(())
}

async fn seed_questions(store: &dyn DocumentStore, sub_domain_id: &str) -> Result<()> {
    for (order, text) in QUESTIONS.iter().enumerate() {
        let doc = json!({
            "subDomainId": sub_domain_id,
            "text": text,
            "order": order,
        });
        if let Value::Object(fields) = doc {
            let id = format!("{}-q{}", sub_domain_id, order + 1);
            store.upsert(Collection::Questions, Some(&id), fields).await?;
        }
    }
    Ok(())
}
