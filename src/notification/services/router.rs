//! Fan-out of outbound messages to registered backends.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::ErrorKind;
use crate::notification::{
    domain::{ChannelId, OutboundMessage, ProviderName},
    ports::{Notifier, NotifierError},
};

/// One message that a backend failed to deliver.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// Backend that failed.
    pub provider: ProviderName,
    /// Target channel.
    pub channel: ChannelId,
    /// Backend error.
    pub error: NotifierError,
}

impl DeliveryFailure {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Delivery
    }
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    /// Messages handed to an enabled backend successfully.
    pub delivered: usize,
    /// Messages addressed to a registered but disabled backend.
    pub skipped_disabled: usize,
    /// Messages whose provider has no registered backend.
    pub unrouted: usize,
    /// Messages an enabled backend failed to deliver.
    pub failures: Vec<DeliveryFailure>,
}

impl BroadcastReport {
    /// Returns `true` when no delivery failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Routes messages to the backend whose provider name they carry.
///
/// Sends are independent and best-effort: they are dispatched concurrently,
/// failures are collected rather than aborting the broadcast, and nothing is
/// retried.
#[derive(Clone, Default)]
pub struct NotificationRouter {
    backends: Vec<Arc<dyn Notifier>>,
}

impl NotificationRouter {
    /// Creates a router with no backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend, enabled or not.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn Notifier>) -> Self {
        self.register(backend);
        self
    }

    /// Registers a backend, enabled or not.
    pub fn register(&mut self, backend: Arc<dyn Notifier>) {
        tracing::info!(
            provider = %backend.provider(),
            enabled = backend.is_enabled(),
            "registered notifier backend"
        );
        self.backends.push(backend);
    }

    /// Returns the registered provider names in registration order.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderName> {
        self.backends.iter().map(|backend| backend.provider()).collect()
    }

    /// Delivers each message through every backend registered for its
    /// provider.
    pub async fn broadcast(&self, messages: &[OutboundMessage]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut sends = Vec::new();

        for message in messages {
            let targets: Vec<&Arc<dyn Notifier>> = self
                .backends
                .iter()
                .filter(|backend| backend.provider() == *message.provider())
                .collect();
            if targets.is_empty() {
                tracing::debug!(
                    provider = %message.provider(),
                    channel = %message.channel(),
                    "no backend registered for provider"
                );
                report.unrouted += 1;
            }
            for backend in targets {
                if !backend.is_enabled() {
                    report.skipped_disabled += 1;
                    continue;
                }
                sends.push(async move {
                    let outcome = backend.send_message(message.channel(), message.text()).await;
                    (message, outcome)
                });
            }
        }

        for (message, outcome) in join_all(sends).await {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    tracing::warn!(
                        provider = %message.provider(),
                        channel = %message.channel(),
                        %error,
                        "notification delivery failed"
                    );
                    report.failures.push(DeliveryFailure {
                        provider: message.provider().clone(),
                        channel: message.channel().clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}
