//! In-memory subscription repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::notification::domain::ChannelId;
use crate::webhook::{
    domain::{RepositoryName, Subscription},
    ports::{SubscriptionRepository, SubscriptionRepositoryError, SubscriptionRepositoryResult},
};

/// Thread-safe in-memory subscription repository.
///
/// Subscriptions are kept in creation order. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    state: Arc<RwLock<Vec<Subscription>>>,
}

impl InMemorySubscriptionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> SubscriptionRepositoryError {
    SubscriptionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn subscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
        at: DateTime<Utc>,
    ) -> SubscriptionRepositoryResult<Subscription> {
        let mut state = self.state.write().map_err(poisoned)?;
        if let Some(existing) = state
            .iter()
            .find(|sub| sub.repository() == repository && sub.channel() == channel)
        {
            return Ok(existing.clone());
        }
        let created = Subscription::new(repository.clone(), channel.clone(), at);
        state.push(created.clone());
        Ok(created)
    }

    async fn unsubscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
    ) -> SubscriptionRepositoryResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let before = state.len();
        state.retain(|sub| !(sub.repository() == repository && sub.channel() == channel));
        Ok(state.len() != before)
    }

    async fn find_by_repository(
        &self,
        repository: &RepositoryName,
    ) -> SubscriptionRepositoryResult<Vec<Subscription>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .iter()
            .filter(|sub| sub.repository() == repository)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> SubscriptionRepositoryResult<Vec<Subscription>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.clone())
    }
}
