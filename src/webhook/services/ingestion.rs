//! Push-event ingestion and subscription management.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::notification::{
    domain::{ChannelId, NotificationDomainError, OutboundMessage, ProviderName},
    services::NotificationRouter,
};
use crate::webhook::{
    domain::{PushEvent, RepositoryName, Subscription, WebhookDomainError, format_push},
    ports::{SubscriptionRepository, SubscriptionRepositoryError},
};

/// Service-level errors for webhook ingestion.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The payload or an input value is invalid.
    #[error(transparent)]
    Domain(#[from] WebhookDomainError),

    /// A channel identifier is invalid.
    #[error(transparent)]
    Channel(#[from] NotificationDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] SubscriptionRepositoryError),
}

impl WebhookError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(WebhookDomainError::Render(_)) | Self::Repository(_) => {
                ErrorKind::Internal
            }
            Self::Domain(_) | Self::Channel(_) => ErrorKind::Validation,
        }
    }
}

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Acknowledgement returned once a push event has been parsed.
///
/// Delivery failures are counted here but never turn the acknowledgement
/// into an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushAck {
    /// Repository named by the event.
    pub repository: String,
    /// Number of subscribed channels.
    pub subscriptions: usize,
    /// Messages delivered.
    pub delivered: usize,
    /// Messages that failed or were skipped.
    pub failed: usize,
}

/// Relays push events to subscribed channels.
pub struct WebhookIngestionService<S, C>
where
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    subscriptions: Arc<S>,
    router: NotificationRouter,
    provider: ProviderName,
    clock: Arc<C>,
}

impl<S, C> Clone for WebhookIngestionService<S, C>
where
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            subscriptions: Arc::clone(&self.subscriptions),
            router: self.router.clone(),
            provider: self.provider.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> WebhookIngestionService<S, C>
where
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    /// Creates the service. Messages are addressed to `provider`.
    #[must_use]
    pub const fn new(
        subscriptions: Arc<S>,
        router: NotificationRouter,
        provider: ProviderName,
        clock: Arc<C>,
    ) -> Self {
        Self {
            subscriptions,
            router,
            provider,
            clock,
        }
    }

    /// Parses, renders and relays a raw push payload.
    ///
    /// A repository without subscriptions is acknowledged without sending
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Domain`] for a malformed payload and
    /// [`WebhookError::Repository`] when subscriptions cannot be read.
    pub async fn on_push_event(&self, raw: &[u8]) -> WebhookResult<PushAck> {
        let event = PushEvent::parse(raw)?;
        let repository = RepositoryName::new(event.repository.name.as_str())?;
        let text = format_push(&event)?;

        let subscriptions = self.subscriptions.find_by_repository(&repository).await?;
        if subscriptions.is_empty() {
            tracing::info!(%repository, "push event for repository without subscriptions");
            return Ok(PushAck {
                repository: repository.to_string(),
                subscriptions: 0,
                delivered: 0,
                failed: 0,
            });
        }

        let messages: Vec<OutboundMessage> = subscriptions
            .iter()
            .map(|sub| {
                OutboundMessage::new(self.provider.clone(), sub.channel().clone(), text.as_str())
            })
            .collect();
        let report = self.router.broadcast(&messages).await;
        let ack = PushAck {
            repository: repository.to_string(),
            subscriptions: subscriptions.len(),
            delivered: report.delivered,
            failed: messages.len().saturating_sub(report.delivered),
        };
        tracing::info!(
            %repository,
            branch = event.branch(),
            subscriptions = ack.subscriptions,
            delivered = ack.delivered,
            failed = ack.failed,
            "relayed push event"
        );
        Ok(ack)
    }

    /// Subscribes a channel to a repository's push events.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank inputs.
    pub async fn subscribe(&self, repository: &str, channel: &str) -> WebhookResult<Subscription> {
        let name = RepositoryName::new(repository)?;
        let target = ChannelId::new(channel)?;
        let subscription = self
            .subscriptions
            .subscribe(&name, &target, self.clock.utc())
            .await?;
        tracing::info!(repository = %name, channel = %target, "subscribed channel");
        Ok(subscription)
    }

    /// Removes a subscription. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank inputs.
    pub async fn unsubscribe(&self, repository: &str, channel: &str) -> WebhookResult<bool> {
        let name = RepositoryName::new(repository)?;
        let target = ChannelId::new(channel)?;
        Ok(self.subscriptions.unsubscribe(&name, &target).await?)
    }

    /// Lists every subscription.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Repository`] on persistence failure.
    pub async fn list_subscriptions(&self) -> WebhookResult<Vec<Subscription>> {
        Ok(self.subscriptions.list_all().await?)
    }
}
