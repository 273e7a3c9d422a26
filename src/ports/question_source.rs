//! Question source port.

use async_trait::async_trait;

use crate::domain::questionnaire::QuestionSet;

/// Why a question set could not be loaded. All variants are retryable from
/// the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("question source unavailable: {0}")]
    Unavailable(String),

    #[error("no questions found for sub-domain '{0}'")]
    Empty(String),

    #[error("malformed question data: {0}")]
    Malformed(String),
}

/// Port for fetching the ordered questions of a sub-domain.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_questions(&self, sub_domain_id: &str) -> Result<QuestionSet, LoadError>;
}
