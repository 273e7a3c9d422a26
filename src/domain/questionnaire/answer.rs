//! Answer values a user can give to a question.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The answer recorded for a single question.
///
/// Persisted by name. Any other stored value is a data error; there is no
/// "unknown" fallback variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerType {
    Compliant,
    NonCompliant,
    NotApplicable,
}

impl AnswerType {
    /// All answer values in display order.
    pub const ALL: [AnswerType; 3] = [
        AnswerType::Compliant,
        AnswerType::NonCompliant,
        AnswerType::NotApplicable,
    ];

    /// Returns the persisted name of this answer.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Compliant => "COMPLIANT",
            AnswerType::NonCompliant => "NON_COMPLIANT",
            AnswerType::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnswerType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("answer", format!("unknown answer '{}'", s)))
    }
}
