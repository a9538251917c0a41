//! Repository-to-channel subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::WebhookDomainError;
use crate::notification::domain::ChannelId;

/// Repository name as reported by push events. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Creates a validated repository name.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookDomainError::EmptyRepository`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, WebhookDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WebhookDomainError::EmptyRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A binding that routes a repository's push events to one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    repository: RepositoryName,
    channel: ChannelId,
    created_at: DateTime<Utc>,
}

impl Subscription {
    /// Creates a subscription record.
    #[must_use]
    pub const fn new(
        repository: RepositoryName,
        channel: ChannelId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            repository,
            channel,
            created_at,
        }
    }

    /// Returns the subscribed repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns the destination channel.
    #[must_use]
    pub const fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns when the subscription was first made.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
