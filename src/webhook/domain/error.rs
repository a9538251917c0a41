//! Error types for webhook parsing, rendering and signature checks.

use thiserror::Error;

/// Errors raised while handling a push event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookDomainError {
    /// The payload is not a valid push event.
    #[error("malformed push payload: {0}")]
    MalformedPayload(String),

    /// The repository name is empty after trimming.
    #[error("repository name must not be empty")]
    EmptyRepository,

    /// The notification template failed to render.
    #[error("failed to render push notification: {0}")]
    Render(String),
}

/// Reasons a webhook signature is refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No signature header was sent.
    #[error("missing signature header")]
    Missing,

    /// The header is not `sha256=<hex>`.
    #[error("signature header is not of the form sha256=<hex>")]
    Malformed,

    /// The digest does not match the body.
    #[error("signature does not match payload")]
    Mismatch,
}
