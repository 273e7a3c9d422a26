//! Session controller.
//!
//! Owns navigation, answer recording and the restore transition for one
//! questionnaire run. All methods are synchronous; the application layer
//! drives loading and persistence around it.

use std::collections::BTreeMap;

use super::{LoadState, SessionError, SessionKey, SessionMetadata, SessionSnapshot};
use crate::domain::foundation::{QuestionId, RecordId, StateMachine, Timestamp, UserId};
use crate::domain::progress::InProgressAssessmentRecord;
use crate::domain::questionnaire::{AnswerType, Question, QuestionSet, ResponseLedger};

/// Why a restore attempt did not change the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSkip {
    QuestionsNotLoaded,
    DifferentUser,
    DifferentSubDomain,
    DifferentFacility,
    CustomAssessment,
    LedgerNotEmpty,
    AlreadyRestored,
    SaveInFlight,
}

/// Result of [`SessionController::try_restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Applied {
        index: usize,
        responses: usize,
        rejected: usize,
    },
    Skipped(RestoreSkip),
}

impl RestoreOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RestoreOutcome::Applied { .. })
    }
}

/// State of one questionnaire run.
///
/// # Invariants
///
/// - `current_index` is within `[0, questions.len() - 1]` once loaded
/// - Answers are only recorded for ids in the loaded question set
/// - A restore is applied at most once per controller
#[derive(Debug, Clone)]
pub struct SessionController {
    user_id: UserId,
    metadata: SessionMetadata,
    load_state: LoadState,
    questions: Option<QuestionSet>,
    ledger: ResponseLedger,
    current_index: usize,
    restored_texts: BTreeMap<QuestionId, String>,
    restoration_applied: bool,
    record_id: Option<RecordId>,
    created_at: Option<Timestamp>,
}

impl SessionController {
    pub fn new(user_id: UserId, metadata: SessionMetadata) -> Self {
        Self {
            user_id,
            metadata,
            load_state: LoadState::Empty,
            questions: None,
            ledger: ResponseLedger::new(),
            current_index: 0,
            restored_texts: BTreeMap::new(),
            restoration_applied: false,
            record_id: None,
            created_at: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn ledger(&self) -> &ResponseLedger {
        &self.ledger
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref()
    }

    pub fn restoration_applied(&self) -> bool {
        self.restoration_applied
    }

    pub fn total_questions(&self) -> usize {
        self.questions.as_ref().map_or(0, QuestionSet::len)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.as_ref()?.get(self.current_index)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Moves into `Loading`. Valid from `Empty` and `LoadFailed`.
    pub fn begin_loading(&mut self) -> Result<(), SessionError> {
        self.load_state = self.load_state.transition_to(LoadState::Loading)?;
        Ok(())
    }

    /// Installs the loaded questions and resets the index to the first one.
    pub fn questions_loaded(&mut self, questions: QuestionSet) -> Result<(), SessionError> {
        self.load_state = self.load_state.transition_to(LoadState::Loaded)?;
        self.questions = Some(questions);
        self.current_index = 0;
        Ok(())
    }

    /// Records a failed load; the caller may retry with `begin_loading`.
    pub fn loading_failed(&mut self) -> Result<(), SessionError> {
        self.load_state = self.load_state.transition_to(LoadState::LoadFailed)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answers and navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Records an answer without moving the index. Idempotent.
    ///
    /// # Errors
    ///
    /// - `NotLoaded` if questions are not loaded yet
    /// - `UnknownQuestion` if the id is not in the loaded set
    pub fn answer_question(
        &mut self,
        question_id: &QuestionId,
        answer: AnswerType,
    ) -> Result<(), SessionError> {
        let questions = self.questions.as_ref().ok_or(SessionError::NotLoaded)?;
        if !questions.contains(question_id) {
            return Err(SessionError::UnknownQuestion(question_id.clone()));
        }
        self.ledger.record(question_id.clone(), answer);
        Ok(())
    }

    /// Answers the question at the current index.
    pub fn answer_current(&mut self, answer: AnswerType) -> Result<QuestionId, SessionError> {
        let id = self
            .current_question()
            .map(|q| q.id.clone())
            .ok_or(SessionError::NotLoaded)?;
        self.answer_question(&id, answer)?;
        Ok(id)
    }

    /// Advances one question. Returns false at the last question.
    pub fn next_question(&mut self) -> bool {
        let last = match &self.questions {
            Some(questions) => questions.last_index(),
            None => return false,
        };
        if self.current_index >= last {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Steps back one question. Returns false at the first question.
    pub fn previous_question(&mut self) -> bool {
        if self.questions.is_none() || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Predicates
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_progress(&self) -> bool {
        !self.ledger.is_empty() || self.current_index != 0
    }

    pub fn is_first_question(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last_question(&self) -> bool {
        self.questions
            .as_ref()
            .is_some_and(|q| self.current_index == q.last_index())
    }

    pub fn has_answer(&self, question_id: &QuestionId) -> bool {
        self.ledger.contains(question_id)
    }

    /// True on the last question once it has been answered.
    pub fn can_complete(&self) -> bool {
        self.is_last_question()
            && self
                .current_question()
                .is_some_and(|q| self.ledger.contains(&q.id))
    }

    /// Texts of the loaded questions, layered over texts replayed from a
    /// saved record so answers to since-removed questions keep their text.
    pub fn question_texts(&self) -> BTreeMap<QuestionId, String> {
        let mut texts = self.restored_texts.clone();
        if let Some(questions) = &self.questions {
            texts.extend(questions.texts());
        }
        texts
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence hooks
    // ─────────────────────────────────────────────────────────────────────────

    /// Remembers the id the store assigned to this session's record.
    pub fn assign_record(&mut self, id: RecordId) {
        self.record_id = Some(id);
    }

    /// Builds the record that represents the current state.
    pub fn to_record(&self, now: Timestamp) -> InProgressAssessmentRecord {
        InProgressAssessmentRecord {
            id: self.record_id.clone(),
            user_id: self.user_id.clone(),
            metadata: self.metadata.clone(),
            current_question_index: self.current_index,
            total_questions: self.total_questions(),
            responses: self.ledger.to_persisted(),
            question_texts: self
                .question_texts()
                .into_iter()
                .map(|(id, text)| (id.as_str().to_string(), text))
                .collect(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    /// Applies a saved record in one step if every precondition holds.
    ///
    /// Eligible when questions are loaded, the record belongs to the same
    /// user, sub-domain and facility, neither side is a custom assessment,
    /// nothing has been answered yet and no restore has happened before.
    /// The index is clamped to the loaded question range.
    pub fn try_restore(&mut self, record: &InProgressAssessmentRecord) -> RestoreOutcome {
        if let Err(skip) = self.restore_eligibility(record) {
            return RestoreOutcome::Skipped(skip);
        }
        let last_index = self.questions.as_ref().map_or(0, QuestionSet::last_index);

        let replayed = record.replay_responses();
        self.ledger = replayed.ledger;
        self.restored_texts = record.replay_question_texts();
        self.current_index = record.current_question_index.min(last_index);
        if record.id.is_some() {
            self.record_id = record.id.clone();
        }
        self.created_at = Some(record.created_at);
        self.restoration_applied = true;

        RestoreOutcome::Applied {
            index: self.current_index,
            responses: self.ledger.len(),
            rejected: replayed.rejected.len(),
        }
    }

    fn restore_eligibility(&self, record: &InProgressAssessmentRecord) -> Result<(), RestoreSkip> {
        if self.restoration_applied {
            return Err(RestoreSkip::AlreadyRestored);
        }
        if !self.load_state.is_loaded() {
            return Err(RestoreSkip::QuestionsNotLoaded);
        }
        let key = self.metadata.key();
        if !record.matches(&self.user_id, &key) {
            return Err(self.key_mismatch(record, &key));
        }
        if key.is_custom() {
            return Err(RestoreSkip::CustomAssessment);
        }
        if !self.ledger.is_empty() {
            return Err(RestoreSkip::LedgerNotEmpty);
        }
        Ok(())
    }

    fn key_mismatch(&self, record: &InProgressAssessmentRecord, key: &SessionKey) -> RestoreSkip {
        if record.user_id != self.user_id {
            return RestoreSkip::DifferentUser;
        }
        match (record.key(), key) {
            (SessionKey::Standard { sub_domain_id, .. }, SessionKey::Standard { .. })
                if sub_domain_id != key.sub_domain_id() =>
            {
                RestoreSkip::DifferentSubDomain
            }
            (SessionKey::Standard { .. }, SessionKey::Standard { .. }) => {
                RestoreSkip::DifferentFacility
            }
            _ => RestoreSkip::CustomAssessment,
        }
    }

    /// Current observable state. Flags owned by the application layer
    /// start out cleared.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            load_state: self.load_state,
            current_index: self.current_index,
            total_questions: self.total_questions(),
            answered: self.ledger.len(),
            current_question: self.current_question().cloned(),
            current_answer: self
                .current_question()
                .and_then(|q| self.ledger.get(&q.id)),
            is_first_question: self.is_first_question(),
            is_last_question: self.is_last_question(),
            has_progress: self.has_progress(),
            can_complete: self.can_complete(),
            record_id: self.record_id.clone(),
            restoration_applied: self.restoration_applied,
            saving: false,
            completed: false,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::fixtures;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn questions(n: usize) -> QuestionSet {
        QuestionSet::new(
            (0..n)
                .map(|i| Question::new(qid(&format!("q{}", i)), format!("Question {}", i), i as i64))
                .collect(),
        )
        .unwrap()
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn loaded(n: usize) -> SessionController {
        let mut c = SessionController::new(user(), fixtures::fire_safety());
        c.begin_loading().unwrap();
        c.questions_loaded(questions(n)).unwrap();
        c
    }

    fn saved_record(index: usize, answered: usize) -> InProgressAssessmentRecord {
        let mut source = loaded(10);
        for i in 0..answered {
            source
                .answer_question(&qid(&format!("q{}", i)), AnswerType::Compliant)
                .unwrap();
        }
        for _ in 0..index {
            source.next_question();
        }
        source.assign_record(RecordId::new("rec-1").unwrap());
        source.to_record(Timestamp::now())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn answering_before_load_fails() {
        let mut c = SessionController::new(user(), fixtures::fire_safety());
        assert_eq!(
            c.answer_question(&qid("q0"), AnswerType::Compliant),
            Err(SessionError::NotLoaded)
        );
    }

    #[test]
    fn failed_load_can_be_retried() {
        let mut c = SessionController::new(user(), fixtures::fire_safety());
        c.begin_loading().unwrap();
        c.loading_failed().unwrap();
        assert_eq!(c.load_state(), LoadState::LoadFailed);
        c.begin_loading().unwrap();
        c.questions_loaded(questions(3)).unwrap();
        assert_eq!(c.load_state(), LoadState::Loaded);
    }

    #[test]
    fn loading_twice_is_rejected() {
        let mut c = loaded(3);
        assert!(matches!(c.begin_loading(), Err(SessionError::ValidationFailed { .. })));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answers and navigation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn unknown_question_is_rejected() {
        let mut c = loaded(3);
        assert_eq!(
            c.answer_question(&qid("nope"), AnswerType::Compliant),
            Err(SessionError::UnknownQuestion(qid("nope")))
        );
        assert!(c.ledger().is_empty());
    }

    #[test]
    fn answering_does_not_move_index() {
        let mut c = loaded(3);
        c.answer_question(&qid("q0"), AnswerType::Compliant).unwrap();
        assert_eq!(c.current_index(), 0);
        assert!(c.has_progress());
    }

    #[test]
    fn navigation_is_clamped() {
        let mut c = loaded(2);
        assert!(!c.previous_question());
        assert!(c.next_question());
        assert!(!c.next_question());
        assert_eq!(c.current_index(), 1);
        assert!(c.is_last_question());
        assert!(c.previous_question());
        assert!(c.is_first_question());
    }

    #[test]
    fn moving_forward_counts_as_progress() {
        let mut c = loaded(3);
        assert!(!c.has_progress());
        c.next_question();
        assert!(c.has_progress());
    }

    #[test]
    fn can_complete_requires_answer_on_last_question() {
        let mut c = loaded(2);
        c.next_question();
        assert!(!c.can_complete());
        c.answer_current(AnswerType::NotApplicable).unwrap();
        assert!(c.can_complete());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Restore
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn restore_replays_saved_state() {
        let record = saved_record(4, 4);
        let mut c = loaded(10);

        let outcome = c.try_restore(&record);

        assert_eq!(
            outcome,
            RestoreOutcome::Applied {
                index: 4,
                responses: 4,
                rejected: 0
            }
        );
        assert_eq!(c.current_index(), 4);
        assert_eq!(c.ledger().len(), 4);
        assert_eq!(c.record_id().map(RecordId::as_str), Some("rec-1"));
    }

    #[test]
    fn restore_applies_only_once() {
        let record = saved_record(1, 0);
        let mut c = loaded(10);
        assert!(c.try_restore(&record).is_applied());
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::AlreadyRestored)
        );
    }

    #[test]
    fn restore_requires_loaded_questions() {
        let record = saved_record(1, 1);
        let mut c = SessionController::new(user(), fixtures::fire_safety());
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::QuestionsNotLoaded)
        );
    }

    #[test]
    fn restore_skipped_once_user_has_answered() {
        let record = saved_record(2, 2);
        let mut c = loaded(10);
        c.answer_question(&qid("q5"), AnswerType::NonCompliant).unwrap();
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::LedgerNotEmpty)
        );
        assert_eq!(c.ledger().len(), 1);
    }

    #[test]
    fn restore_skipped_for_other_facility() {
        let mut record = saved_record(2, 2);
        record.metadata.facility_id = "fac-9".to_string();
        let mut c = loaded(10);
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::DifferentFacility)
        );
    }

    #[test]
    fn restore_skipped_for_custom_assessments() {
        let mut record = saved_record(2, 2);
        record.metadata.is_custom_assessment = true;
        let mut c = loaded(10);
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::CustomAssessment)
        );
    }

    #[test]
    fn restore_skipped_for_other_user_or_sub_domain() {
        let mut c = loaded(10);

        let mut record = saved_record(2, 2);
        record.user_id = UserId::new("user-2").unwrap();
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::DifferentUser)
        );

        let mut record = saved_record(2, 2);
        record.metadata.sub_domain_id = "sub-9".to_string();
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::DifferentSubDomain)
        );
        assert!(!c.restoration_applied());
    }

    #[test]
    fn custom_session_never_restores_even_its_own_record() {
        let mut meta = fixtures::fire_safety();
        meta.is_custom_assessment = true;
        let mut record = saved_record(2, 2);
        record.metadata = meta.clone();
        let mut c = SessionController::new(user(), meta);
        c.begin_loading().unwrap();
        c.questions_loaded(questions(10)).unwrap();

        assert!(record.matches(&user(), &c.metadata().key()));
        assert_eq!(
            c.try_restore(&record),
            RestoreOutcome::Skipped(RestoreSkip::CustomAssessment)
        );
    }

    #[test]
    fn restore_clamps_index_to_question_range() {
        let record = saved_record(9, 0);
        let mut c = loaded(5);
        c.try_restore(&record);
        assert_eq!(c.current_index(), 4);
    }

    #[test]
    fn restored_texts_survive_under_loaded_texts() {
        let mut record = saved_record(0, 0);
        record
            .question_texts
            .insert("retired".to_string(), "Old question".to_string());
        let mut c = loaded(2);
        c.try_restore(&record);

        let texts = c.question_texts();
        assert_eq!(texts.get(&qid("retired")).unwrap(), "Old question");
        assert_eq!(texts.get(&qid("q0")).unwrap(), "Question 0");
    }

    #[test]
    fn save_then_restore_preserves_state() {
        let mut source = loaded(6);
        source.answer_question(&qid("q0"), AnswerType::Compliant).unwrap();
        source.answer_question(&qid("q1"), AnswerType::NonCompliant).unwrap();
        source.next_question();
        source.next_question();
        let record = source.to_record(Timestamp::now());

        let mut restored = loaded(6);
        restored.try_restore(&record);

        assert_eq!(restored.current_index(), source.current_index());
        assert_eq!(restored.ledger(), source.ledger());
        assert_eq!(restored.question_texts(), source.question_texts());
    }
}
