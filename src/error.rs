//! Cross-module error classification.
//!
//! Service errors stay module-specific; [`ErrorKind`] lets callers such as the
//! command surface and the HTTP layer decide how to render a failure without
//! matching every variant.

use std::fmt;

/// Broad category of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed input, rejected before any mutation.
    Validation,
    /// The referenced task or user does not exist.
    NotFound,
    /// A uniqueness race that the caller may retry.
    Conflict,
    /// A notification could not be delivered.
    Delivery,
    /// Persistence or infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns a short lowercase label for logs and responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Delivery => "delivery",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
