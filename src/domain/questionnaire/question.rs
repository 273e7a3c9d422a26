//! Questions and the ordered question set of a sub-domain.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{QuestionId, ValidationError};

/// A single question as authored in the question catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub order: i64,
}

impl Question {
    pub fn new(id: QuestionId, text: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            text: text.into(),
            order,
        }
    }
}

/// Immutable, ordered list of questions.
///
/// # Invariants
///
/// - Non-empty
/// - Sorted ascending by `order`, ties broken by id
/// - Question ids are unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Builds a question set from questions in any order.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if no questions are given
    /// - `InvalidFormat` if a question id appears twice
    pub fn new(mut questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::empty_field("questions"));
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id.clone()) {
                return Err(ValidationError::invalid_format(
                    "questions",
                    format!("duplicate question id '{}'", q.id),
                ));
            }
        }

        questions.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.iter().any(|q| &q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Question texts keyed by id.
    pub fn texts(&self) -> BTreeMap<QuestionId, String> {
        self.questions
            .iter()
            .map(|q| (q.id.clone(), q.text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, order: i64) -> Question {
        Question::new(QuestionId::new(id).unwrap(), format!("Text {}", id), order)
    }

    #[test]
    fn sorts_by_order_then_id() {
        let set = QuestionSet::new(vec![q("c", 2), q("b", 1), q("a", 2)]).unwrap();
        let ids: Vec<_> = set.iter().map(|q| q.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn rejects_empty_set() {
        assert!(matches!(
            QuestionSet::new(vec![]),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = QuestionSet::new(vec![q("a", 1), q("a", 2)]);
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn texts_are_keyed_by_id() {
        let set = QuestionSet::new(vec![q("a", 1)]).unwrap();
        let texts = set.texts();
        assert_eq!(texts.get(&QuestionId::new("a").unwrap()).unwrap(), "Text a");
    }
}
