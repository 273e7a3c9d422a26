//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, ValidationError};

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Questions have not finished loading.
    NotLoaded,
    /// The question id is not part of the loaded set.
    UnknownQuestion(QuestionId),
    /// Invalid state for operation.
    InvalidState(String),
    /// Completion requested before the last question was answered.
    NotReadyToComplete,
    /// The session was already turned into a report.
    AlreadyCompleted,
    /// Questions could not be loaded; the load may be retried.
    Load(String),
    /// Saving or deleting progress failed.
    Persistence(String),
    /// Restore was attempted while its preconditions did not hold.
    RestoreGuardViolation(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
}

impl SessionError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }
    pub fn persistence(message: impl Into<String>) -> Self {
        SessionError::Persistence(message.into())
    }
    pub fn restore_guard(message: impl Into<String>) -> Self {
        SessionError::RestoreGuardViolation(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotLoaded => ErrorCode::QuestionsNotLoaded,
            SessionError::UnknownQuestion(_) => ErrorCode::UnknownQuestion,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::NotReadyToComplete => ErrorCode::NotReadyToComplete,
            SessionError::AlreadyCompleted => ErrorCode::AlreadyCompleted,
            SessionError::Load(_) => ErrorCode::SourceUnavailable,
            SessionError::Persistence(_) => ErrorCode::DatabaseError,
            SessionError::RestoreGuardViolation(_) => ErrorCode::RestoreGuardViolation,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotLoaded => "Questions have not been loaded".to_string(),
            SessionError::UnknownQuestion(id) => format!("Unknown question: {}", id),
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::NotReadyToComplete => {
                "Answer the last question before completing the assessment".to_string()
            }
            SessionError::AlreadyCompleted => "Assessment already completed".to_string(),
            SessionError::Load(msg) => format!("Could not load questions: {}", msg),
            SessionError::Persistence(msg) => format!("Could not save progress: {}", msg),
            SessionError::RestoreGuardViolation(msg) => format!("Restore skipped: {}", msg),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::QuestionsNotLoaded => SessionError::NotLoaded,
            ErrorCode::AlreadyCompleted => SessionError::AlreadyCompleted,
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.to_string()),
            ErrorCode::ValidationFailed => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => SessionError::Persistence(err.to_string()),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        SessionError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}
