//! The in-memory map of answers for an active session.

use std::collections::BTreeMap;

use super::AnswerType;
use crate::domain::foundation::QuestionId;

/// Mapping from question id to the answer given.
///
/// Keys are unique; recording an answer twice for the same question
/// overwrites the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseLedger {
    answers: BTreeMap<QuestionId, AnswerType>,
}

impl ResponseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, returning the previous answer if one existed.
    pub fn record(&mut self, question_id: QuestionId, answer: AnswerType) -> Option<AnswerType> {
        self.answers.insert(question_id, answer)
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<AnswerType> {
        self.answers.get(question_id).copied()
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerType)> {
        self.answers.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<QuestionId, AnswerType> {
        &self.answers
    }

    /// Persisted form: question id to answer name.
    pub fn to_persisted(&self) -> BTreeMap<String, String> {
        self.answers
            .iter()
            .map(|(id, answer)| (id.as_str().to_string(), answer.as_str().to_string()))
            .collect()
    }
}

impl FromIterator<(QuestionId, AnswerType)> for ResponseLedger {
    fn from_iter<I: IntoIterator<Item = (QuestionId, AnswerType)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    #[test]
    fn record_overwrites_previous_answer() {
        let mut ledger = ResponseLedger::new();
        assert_eq!(ledger.record(qid("q1"), AnswerType::Compliant), None);
        assert_eq!(
            ledger.record(qid("q1"), AnswerType::NonCompliant),
            Some(AnswerType::Compliant)
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&qid("q1")), Some(AnswerType::NonCompliant));
    }

    #[test]
    fn persisted_form_uses_answer_names() {
        let ledger: ResponseLedger = [(qid("q2"), AnswerType::NotApplicable)].into_iter().collect();
        assert_eq!(
            ledger.to_persisted().get("q2").map(String::as_str),
            Some("NOT_APPLICABLE")
        );
    }

    fn answer_strategy() -> impl Strategy<Value = AnswerType> {
        prop_oneof![
            Just(AnswerType::Compliant),
            Just(AnswerType::NonCompliant),
            Just(AnswerType::NotApplicable),
        ]
    }

    proptest! {
        #[test]
        fn recording_twice_equals_recording_once(
            entries in prop::collection::vec(("[a-z]{1,4}", answer_strategy()), 0..20),
        ) {
            let mut once = ResponseLedger::new();
            let mut twice = ResponseLedger::new();
            for (id, answer) in &entries {
                once.record(qid(id), *answer);
                twice.record(qid(id), *answer);
                twice.record(qid(id), *answer);
            }
            prop_assert_eq!(once, twice);
        }
    }
}
