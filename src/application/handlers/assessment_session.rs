//! AssessmentSession - the live session a screen drives.
//!
//! Wraps a [`SessionController`] with question loading, saving, restore and
//! completion, and publishes a [`SessionSnapshot`] after every change.

use std::sync::Arc;
use tokio::sync::watch;

use super::complete_assessment::{
    CompleteAssessmentCommand, CompleteAssessmentHandler, CompletionResult,
};
use super::restore_coordinator::RestoreCoordinator;
use crate::application::{PendingSave, ProgressGateway, SaveOutcome};
use crate::domain::foundation::{QuestionId, RecordId, Timestamp, UserId};
use crate::domain::progress::InProgressAssessmentRecord;
use crate::domain::questionnaire::AnswerType;
use crate::domain::session::{
    RestoreOutcome, RestoreSkip, SessionController, SessionError, SessionMetadata,
    SessionSnapshot,
};
use crate::ports::QuestionSource;

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionServices {
    pub questions: Arc<dyn QuestionSource>,
    pub gateway: Arc<ProgressGateway>,
    pub completion: Arc<CompleteAssessmentHandler>,
    /// Save after answers and navigation once the session owns a record.
    pub autosave: bool,
}

/// What a save reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Confirmed(RecordId),
    /// The write is still running; its id is collected later.
    Unconfirmed,
}

pub struct AssessmentSession {
    controller: SessionController,
    services: SessionServices,
    restore: RestoreCoordinator,
    in_flight: Option<PendingSave>,
    completed: bool,
    last_error: Option<String>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl AssessmentSession {
    pub fn new(
        user_id: UserId,
        metadata: SessionMetadata,
        services: SessionServices,
    ) -> Result<Self, SessionError> {
        metadata.validate()?;
        let controller = SessionController::new(user_id, metadata);
        let (snapshot_tx, _rx) = watch::channel(controller.snapshot());
        Ok(Self {
            controller,
            services,
            restore: RestoreCoordinator::new(),
            in_flight: None,
            completed: false,
            last_error: None,
            snapshot_tx,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// True while an offered record waits to be applied.
    pub fn has_pending_restore(&self) -> bool {
        self.restore.has_pending()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading and restore
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetches the questions of the session's sub-domain.
    ///
    /// On failure the session is left in `LoadFailed` and may be retried.
    /// On success any record held for restore is evaluated.
    pub async fn load_questions(&mut self) -> Result<(), SessionError> {
        self.controller.begin_loading()?;
        self.publish();

        let sub_domain_id = self.controller.metadata().sub_domain_id.clone();
        match self.services.questions.fetch_questions(&sub_domain_id).await {
            Ok(questions) => {
                tracing::debug!(sub_domain_id = %sub_domain_id, count = questions.len(), "Questions loaded");
                self.controller.questions_loaded(questions)?;
                self.last_error = None;
                self.evaluate_restore();
                self.publish();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(sub_domain_id = %sub_domain_id, error = %err, "Question load failed");
                self.controller.loading_failed()?;
                let err = SessionError::Load(err.to_string());
                self.last_error = Some(err.message());
                self.publish();
                Err(err)
            }
        }
    }

    /// Offers a saved record for restore, for example one picked from a
    /// resume list. Applied now if questions are loaded, otherwise held
    /// until they are.
    pub fn offer_restore(&mut self, record: InProgressAssessmentRecord) -> RestoreOutcome {
        self.restore.offer(record);
        let outcome = self
            .evaluate_restore()
            .unwrap_or(RestoreOutcome::Skipped(RestoreSkip::QuestionsNotLoaded));
        self.publish();
        outcome
    }

    /// Looks up this user's pending record for the same assessment and
    /// offers it. Returns `None` when there is none.
    pub async fn discover_pending(&mut self) -> Result<Option<RestoreOutcome>, SessionError> {
        let record = self
            .services
            .gateway
            .find_pending(self.controller.user_id(), self.controller.metadata())
            .await?;
        Ok(record.map(|r| self.offer_restore(r)))
    }

    fn evaluate_restore(&mut self) -> Option<RestoreOutcome> {
        let save_in_flight = self.is_saving();
        self.restore.evaluate(&mut self.controller, save_in_flight)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answers and navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn answer(&mut self, question_id: &QuestionId, answer: AnswerType) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.controller.answer_question(question_id, answer)?;
        self.publish();
        self.autosave().await;
        Ok(())
    }

    pub async fn answer_current(&mut self, answer: AnswerType) -> Result<QuestionId, SessionError> {
        self.ensure_open()?;
        let id = self.controller.answer_current(answer)?;
        self.publish();
        self.autosave().await;
        Ok(id)
    }

    pub async fn next_question(&mut self) -> bool {
        let moved = self.controller.next_question();
        if moved {
            self.publish();
            self.autosave().await;
        }
        moved
    }

    pub async fn previous_question(&mut self) -> bool {
        let moved = self.controller.previous_question();
        if moved {
            self.publish();
            self.autosave().await;
        }
        moved
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Saves the current state ("save and exit").
    ///
    /// A previous unconfirmed write is waited for first so its id is
    /// reused instead of creating a second record.
    pub async fn save_progress(&mut self) -> Result<SaveStatus, SessionError> {
        self.ensure_open()?;
        self.harvest_in_flight().await;

        let record = self.controller.to_record(Timestamp::now());
        let result = self.services.gateway.save(record).await;
        let status = match result {
            Ok(SaveOutcome::Confirmed(id)) => {
                self.controller.assign_record(id.clone());
                self.last_error = None;
                SaveStatus::Confirmed(id)
            }
            Ok(SaveOutcome::Unconfirmed(pending)) => {
                self.in_flight = Some(pending);
                SaveStatus::Unconfirmed
            }
            Err(err) => {
                let err = SessionError::from(err);
                self.last_error = Some(err.message());
                self.publish();
                return Err(err);
            }
        };
        self.publish();
        Ok(status)
    }

    /// Drops the session without saving. An unconfirmed write keeps running
    /// detached.
    pub fn discard(self) {
        if self.in_flight.is_some() {
            tracing::debug!("Session discarded with a save still in flight");
        }
    }

    /// Saves after an answer or a move, once the session owns a record.
    ///
    /// A finished background write hands over its id here; one still
    /// running is left alone so navigation never blocks on it.
    async fn autosave(&mut self) {
        if !self.services.autosave || self.completed {
            return;
        }
        if self.in_flight.as_ref().is_some_and(PendingSave::is_finished) {
            self.harvest_in_flight().await;
        }
        if self.controller.record_id().is_none() {
            return;
        }
        if let Err(err) = self.save_progress().await {
            tracing::warn!(error = %err, "Auto-save failed");
        }
    }

    async fn harvest_in_flight(&mut self) {
        let Some(pending) = self.in_flight.take() else {
            return;
        };
        match pending.resolve().await {
            Ok(id) => {
                tracing::debug!(record_id = %id, "Collected id of earlier save");
                self.controller.assign_record(id);
                // The landed write replaced the stored record a held
                // candidate was read from.
                if self.restore.discard().is_some() {
                    tracing::debug!("Held restore candidate superseded by own save");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Earlier save failed");
                self.evaluate_restore();
            }
        }
        self.publish();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completion
    // ─────────────────────────────────────────────────────────────────────────

    /// Completes the assessment. Only valid on the answered last question.
    /// Afterwards the session refuses to save again.
    pub async fn complete(&mut self) -> Result<CompletionResult, SessionError> {
        self.ensure_open()?;
        if !self.controller.can_complete() {
            return Err(SessionError::NotReadyToComplete);
        }
        self.harvest_in_flight().await;

        let cmd = CompleteAssessmentCommand {
            user_id: self.controller.user_id().clone(),
            metadata: self.controller.metadata().clone(),
            ledger: self.controller.ledger().clone(),
            question_texts: self.controller.question_texts(),
            record_id: self.controller.record_id().cloned(),
        };
        match self.services.completion.handle(cmd).await {
            Ok(result) => {
                self.completed = true;
                self.last_error = None;
                self.publish();
                Ok(result)
            }
            Err(err) => {
                self.last_error = Some(err.message());
                self.publish();
                Err(err)
            }
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.completed {
            return Err(SessionError::AlreadyCompleted);
        }
        Ok(())
    }

    fn publish(&self) {
        let mut snapshot = self.controller.snapshot();
        snapshot.saving = self.is_saving();
        snapshot.completed = self.completed;
        snapshot.last_error = self.last_error.clone();
        self.snapshot_tx.send_replace(snapshot);
    }
}
