//! Error types for identity domain validation.

use thiserror::Error;

/// Errors returned while constructing identity domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The external user identifier is empty after trimming.
    #[error("external user identifier must not be empty")]
    EmptyExternalId,

    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The internal user identifier is not a positive integer.
    #[error("invalid user identifier {0}, expected a positive integer")]
    InvalidUserId(i64),
}
