//! Port for delivering text to a channel on a messaging provider.

use crate::notification::domain::{ChannelId, ProviderName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// A messaging backend keyed by a fixed provider name.
///
/// Disabled backends stay registered; [`Notifier::is_enabled`] gates sending,
/// not registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the provider name messages must carry to reach this backend.
    fn provider(&self) -> ProviderName;

    /// Returns `true` when the backend may send.
    fn is_enabled(&self) -> bool;

    /// Delivers `text` to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the provider rejects the message or
    /// cannot be reached.
    async fn send_message(&self, channel: &ChannelId, text: &str) -> NotifierResult<()>;
}

/// Errors returned by notifier backends.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The backend has no credentials configured.
    #[error("{0} backend has no token configured")]
    MissingToken(ProviderName),

    /// The provider answered but refused the message.
    #[error("{provider} rejected message to {channel}: {reason}")]
    Rejected {
        /// Provider that refused delivery.
        provider: ProviderName,
        /// Target channel.
        channel: ChannelId,
        /// Provider-supplied reason or HTTP status.
        reason: String,
    },

    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
