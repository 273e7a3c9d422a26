//! Questionnaire module - questions, answers and the response ledger.

mod answer;
mod ledger;
mod question;

pub use answer::AnswerType;
pub use ledger::ResponseLedger;
pub use question::{Question, QuestionSet};
