//! Repository port for push-event subscriptions.

use crate::notification::domain::ChannelId;
use crate::webhook::domain::{RepositoryName, Subscription};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for subscription repository operations.
pub type SubscriptionRepositoryResult<T> = Result<T, SubscriptionRepositoryError>;

/// Subscription persistence contract.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Binds `channel` to `repository`. Subscribing an existing pair returns
    /// the original subscription unchanged.
    async fn subscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
        at: DateTime<Utc>,
    ) -> SubscriptionRepositoryResult<Subscription>;

    /// Removes the binding. Returns `false` when it did not exist.
    async fn unsubscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
    ) -> SubscriptionRepositoryResult<bool>;

    /// Returns every subscription for the repository, matched exactly.
    async fn find_by_repository(
        &self,
        repository: &RepositoryName,
    ) -> SubscriptionRepositoryResult<Vec<Subscription>>;

    /// Returns every subscription.
    async fn list_all(&self) -> SubscriptionRepositoryResult<Vec<Subscription>>;
}

/// Errors returned by subscription repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionRepositoryError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SubscriptionRepositoryError {
    /// Wraps a data-quality error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
