//! Error types for the quiz rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Callers that need to react to a specific failure
//! downcast to [`QuizError`].

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific quiz scenarios
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Corrupt persisted state under '{key}': {reason}")]
    CorruptPersistedState { key: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Question bank error: {message}")]
    QuestionBankError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl QuizError {
    /// Shorthand for a corrupt-state error on the given key
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::CorruptPersistedState {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
