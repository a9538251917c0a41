//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty or whitespace only.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The role tag is empty or whitespace only.
    #[error("role must not be empty")]
    EmptyRole,

    /// The status string is not one of the three accepted values.
    #[error(
        "invalid status '{0}', expected one of 'Not Started', 'In Progress', 'Completed'"
    )]
    InvalidStatus(String),

    /// The task identifier is not a positive integer.
    #[error("invalid task identifier {0}, expected a positive integer")]
    InvalidTaskId(i64),
}

/// Error returned while parsing task status strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl From<ParseTaskStatusError> for TaskDomainError {
    fn from(err: ParseTaskStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}
