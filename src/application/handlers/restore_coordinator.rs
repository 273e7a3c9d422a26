//! RestoreCoordinator - replays a saved record into a session at most once.

use crate::domain::foundation::ErrorCode;
use crate::domain::progress::InProgressAssessmentRecord;
use crate::domain::session::{RestoreOutcome, RestoreSkip, SessionController};

/// Holds a pending record until the session can take it.
///
/// A record may arrive before the questions finish loading; it is kept and
/// evaluated again once they have.
#[derive(Debug, Default)]
pub struct RestoreCoordinator {
    pending: Option<InProgressAssessmentRecord>,
}

impl RestoreCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previously offered record.
    pub fn offer(&mut self, record: InProgressAssessmentRecord) {
        tracing::debug!(record_id = ?record.id, "Restore candidate offered");
        self.pending = Some(record);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forgets the held record, returning it if there was one.
    pub fn discard(&mut self) -> Option<InProgressAssessmentRecord> {
        self.pending.take()
    }

    /// Tries to apply the held record. Returns `None` when nothing is held.
    ///
    /// The record is kept while questions are still loading or a save is in
    /// flight, and dropped once applied or found ineligible.
    pub fn evaluate(
        &mut self,
        controller: &mut SessionController,
        save_in_flight: bool,
    ) -> Option<RestoreOutcome> {
        let record = self.pending.as_ref()?;

        if save_in_flight {
            tracing::warn!(
                code = %ErrorCode::RestoreGuardViolation,
                record_id = ?record.id,
                "Restore skipped while a save is in flight"
            );
            return Some(RestoreOutcome::Skipped(RestoreSkip::SaveInFlight));
        }

        let outcome = controller.try_restore(record);
        match &outcome {
            RestoreOutcome::Applied {
                index,
                responses,
                rejected,
            } => {
                tracing::info!(
                    record_id = ?record.id,
                    index,
                    responses,
                    "Session restored"
                );
                if *rejected > 0 {
                    tracing::warn!(rejected, "Dropped unreadable responses during restore");
                }
                self.pending = None;
            }
            RestoreOutcome::Skipped(RestoreSkip::QuestionsNotLoaded) => {
                tracing::debug!("Restore deferred until questions are loaded");
            }
            RestoreOutcome::Skipped(reason) => {
                tracing::debug!(?reason, "Restore not applicable");
                self.pending = None;
            }
        }
        Some(outcome)
    }
}
