//! Observable session state.

use crate::domain::foundation::RecordId;
use crate::domain::questionnaire::{AnswerType, Question};

use super::LoadState;

/// Everything a screen needs to render the session, published after each
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub load_state: LoadState,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub current_question: Option<Question>,
    pub current_answer: Option<AnswerType>,
    pub is_first_question: bool,
    pub is_last_question: bool,
    pub has_progress: bool,
    pub can_complete: bool,
    pub record_id: Option<RecordId>,
    pub restoration_applied: bool,
    /// A save is currently in flight.
    pub saving: bool,
    pub completed: bool,
    pub last_error: Option<String>,
}
