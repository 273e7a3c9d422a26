//! SummaryRetryWorker - regenerates pending summaries when the device comes
//! back online.

use std::sync::Arc;
use tokio::sync::watch;

use crate::application::report_summarizer::apply_generated;
use crate::application::{ReportStore, ReportSummarizer, SummaryOutcome};
use crate::domain::foundation::{DomainError, ReportId, UserId};
use crate::domain::report::AiSummaryStatus;
use crate::ports::ConnectivityObserver;

/// Result of one retry attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    Offline,
    NothingDisplayed,
    NotFound,
    /// The summary was no longer pending.
    AlreadySettled(AiSummaryStatus),
    Updated,
    /// Generation failed; the report stays pending for the next transition.
    StillPending,
}

/// Background worker reacting to connectivity transitions.
///
/// By default only the report currently on screen is retried. With
/// `sweep_all_pending` every pending report of the user is retried too.
pub struct SummaryRetryWorker {
    user_id: UserId,
    reports: Arc<ReportStore>,
    summarizer: Arc<ReportSummarizer>,
    connectivity: Arc<dyn ConnectivityObserver>,
    displayed: watch::Sender<Option<ReportId>>,
    sweep_all_pending: bool,
}

impl SummaryRetryWorker {
    pub fn new(
        user_id: UserId,
        reports: Arc<ReportStore>,
        summarizer: Arc<ReportSummarizer>,
        connectivity: Arc<dyn ConnectivityObserver>,
    ) -> Self {
        let (displayed, _rx) = watch::channel(None);
        Self {
            user_id,
            reports,
            summarizer,
            connectivity,
            displayed,
            sweep_all_pending: false,
        }
    }

    pub fn with_sweep_all_pending(mut self, sweep: bool) -> Self {
        self.sweep_all_pending = sweep;
        self
    }

    /// Sets the report on screen, or clears it with `None`.
    pub fn display(&self, report_id: Option<ReportId>) {
        self.displayed.send_replace(report_id);
    }

    pub fn displayed(&self) -> Option<ReportId> {
        self.displayed.borrow().clone()
    }

    /// Run the retry loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut connectivity = self.connectivity.subscribe();
        connectivity.borrow_and_update();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::debug!("Summary retry worker stopping");
                        return;
                    }
                }

                changed = connectivity.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Connectivity source closed, summary retry worker stopping");
                        return;
                    }
                    let state = *connectivity.borrow_and_update();
                    if state.is_online() {
                        self.handle_online().await;
                    }
                }
            }
        }
    }

    /// Everything done on one transition to online. Errors are logged.
    pub async fn handle_online(&self) {
        match self.retry_displayed().await {
            Ok(outcome) => tracing::debug!(?outcome, "Displayed report retry finished"),
            Err(err) => tracing::warn!(error = %err, "Displayed report retry failed"),
        }
        if self.sweep_all_pending {
            match self.sweep_pending().await {
                Ok(updated) => tracing::debug!(updated, "Pending report sweep finished"),
                Err(err) => tracing::warn!(error = %err, "Pending report sweep failed"),
            }
        }
    }

    pub async fn retry_displayed(&self) -> Result<RetryOutcome, DomainError> {
        match self.displayed() {
            Some(id) => self.retry_report(&id).await,
            None => Ok(RetryOutcome::NothingDisplayed),
        }
    }

    pub async fn retry_report(&self, id: &ReportId) -> Result<RetryOutcome, DomainError> {
        if !self.summarizer.is_online() {
            return Ok(RetryOutcome::Offline);
        }
        let mut report = match self.reports.find_by_id(id).await? {
            Some(report) => report,
            None => return Ok(RetryOutcome::NotFound),
        };
        if !report.is_summary_pending() {
            return Ok(RetryOutcome::AlreadySettled(report.ai_summary_status()));
        }

        match self.summarizer.attempt(&report).await {
            SummaryOutcome::Generated(summary) => {
                apply_generated(&mut report, &summary)?;
                self.reports.save(&report).await?;
                tracing::info!(report_id = %id, "Pending summary generated");
                Ok(RetryOutcome::Updated)
            }
            SummaryOutcome::Offline | SummaryOutcome::Failed(_) => Ok(RetryOutcome::StillPending),
        }
    }

    /// Retries every pending report of the user. Returns how many were
    /// updated.
    pub async fn sweep_pending(&self) -> Result<usize, DomainError> {
        let pending = self.reports.list_pending_for_user(&self.user_id).await?;
        let mut updated = 0;
        for report in pending {
            if self.retry_report(report.id()).await? == RetryOutcome::Updated {
                updated += 1;
            }
        }
        Ok(updated)
    }
}
