//! In-progress assessment record.
//!
//! One record exists per user and `(sub-domain, facility)` for standard
//! assessments. It is created on the first save, updated in place on every
//! later save and deleted once the assessment is completed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{QuestionId, RecordId, Timestamp, UserId, ValidationError};
use crate::domain::questionnaire::{AnswerType, ResponseLedger};
use crate::domain::session::{SessionKey, SessionMetadata};

/// Snapshot of a session as stored in the `in_progress_assessments`
/// collection.
///
/// Responses are kept in their persisted string form; they are parsed into
/// [`AnswerType`] only when replayed into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressAssessmentRecord {
    /// Absent until the store has accepted the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: UserId,
    #[serde(flatten)]
    pub metadata: SessionMetadata,
    pub current_question_index: usize,
    pub total_questions: usize,
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub question_texts: BTreeMap<String, String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Responses parsed out of a record, plus the entries that could not be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayedResponses {
    pub ledger: ResponseLedger,
    pub rejected: Vec<ValidationError>,
}

impl InProgressAssessmentRecord {
    pub fn key(&self) -> SessionKey {
        self.metadata.key()
    }

    /// True if this record belongs to `user_id` and matches `key`.
    pub fn matches(&self, user_id: &UserId, key: &SessionKey) -> bool {
        &self.user_id == user_id && &self.key() == key
    }

    /// Parses the persisted responses.
    ///
    /// Entries with an empty question id or an unknown answer name are
    /// rejected individually; the rest are kept.
    pub fn replay_responses(&self) -> ReplayedResponses {
        let mut replayed = ReplayedResponses::default();
        for (raw_id, raw_answer) in &self.responses {
            let parsed = QuestionId::new(raw_id.clone()).and_then(|id| {
                raw_answer
                    .parse::<AnswerType>()
                    .map(|answer| (id, answer))
                    .map_err(|_| {
                        ValidationError::invalid_format(
                            format!("responses.{}", raw_id),
                            format!("unknown answer '{}'", raw_answer),
                        )
                    })
            });
            match parsed {
                Ok((id, answer)) => {
                    replayed.ledger.record(id, answer);
                }
                Err(err) => replayed.rejected.push(err),
            }
        }
        replayed
    }

    /// Question texts keyed by parsed id. Entries with empty ids are skipped.
    pub fn replay_question_texts(&self) -> BTreeMap<QuestionId, String> {
        self.question_texts
            .iter()
            .filter_map(|(id, text)| QuestionId::new(id.clone()).ok().map(|id| (id, text.clone())))
            .collect()
    }
}
