//! Recording notifier for tests and local runs.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::notification::{
    domain::{ChannelId, ProviderName},
    ports::{Notifier, NotifierError, NotifierResult},
};

/// A delivery captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelivery {
    /// Target channel.
    pub channel: ChannelId,
    /// Delivered text.
    pub text: String,
}

/// In-memory notifier that records every delivery.
///
/// Channels registered with [`RecordingNotifier::fail_channel`] reject
/// delivery. Clones share the same recordings.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    provider: ProviderName,
    enabled: bool,
    state: Arc<RwLock<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    deliveries: Vec<RecordedDelivery>,
    failing: HashSet<ChannelId>,
}

impl RecordingNotifier {
    /// Creates an enabled recorder for `provider`.
    #[must_use]
    pub fn new(provider: ProviderName) -> Self {
        Self {
            provider,
            enabled: true,
            state: Arc::default(),
        }
    }

    /// Creates a recorder that is registered but disabled.
    #[must_use]
    pub fn disabled(provider: ProviderName) -> Self {
        Self {
            enabled: false,
            ..Self::new(provider)
        }
    }

    /// Makes deliveries to `channel` fail from now on.
    pub fn fail_channel(&self, channel: ChannelId) {
        if let Ok(mut state) = self.state.write() {
            state.failing.insert(channel);
        }
    }

    /// Returns a snapshot of the deliveries made so far.
    #[must_use]
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.state
            .read()
            .map(|state| state.deliveries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn provider(&self) -> ProviderName {
        self.provider.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send_message(&self, channel: &ChannelId, text: &str) -> NotifierResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| NotifierError::transport(std::io::Error::other(err.to_string())))?;
        if state.failing.contains(channel) {
            return Err(NotifierError::Rejected {
                provider: self.provider.clone(),
                channel: channel.clone(),
                reason: "channel configured to fail".to_owned(),
            });
        }
        state.deliveries.push(RecordedDelivery {
            channel: channel.clone(),
            text: text.to_owned(),
        });
        Ok(())
    }
}
