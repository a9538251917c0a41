//! Provider names, channel identifiers and outbound messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing notification values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// Provider names are non-empty lowercase ASCII identifiers.
    #[error("invalid provider name '{0}', expected lowercase letters, digits or '-'")]
    InvalidProvider(String),

    /// The channel identifier is empty after trimming.
    #[error("channel identifier must not be empty")]
    EmptyChannel,
}

/// Fixed name of a messaging backend, such as `discord` or `slack`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Provider name of the Discord backend.
    pub const DISCORD: &'static str = "discord";
    /// Provider name of the Slack backend.
    pub const SLACK: &'static str = "slack";

    /// Creates a validated provider name.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::InvalidProvider`] unless the value
    /// is a non-empty run of lowercase ASCII letters, digits and hyphens.
    pub fn new(value: impl Into<String>) -> Result<Self, NotificationDomainError> {
        let raw = value.into();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if valid {
            Ok(Self(raw))
        } else {
            Err(NotificationDomainError::InvalidProvider(raw))
        }
    }

    /// Returns the Discord provider name.
    #[must_use]
    pub fn discord() -> Self {
        Self(Self::DISCORD.to_owned())
    }

    /// Returns the Slack provider name.
    #[must_use]
    pub fn slack() -> Self {
        Self(Self::SLACK.to_owned())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = NotificationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(value: ProviderName) -> Self {
        value.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination channel on a provider. Opaque to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a validated channel identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::EmptyChannel`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, NotificationDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NotificationDomainError::EmptyChannel);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A text message addressed to one channel on one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    provider: ProviderName,
    channel: ChannelId,
    text: String,
}

impl OutboundMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(provider: ProviderName, channel: ChannelId, text: impl Into<String>) -> Self {
        Self {
            provider,
            channel,
            text: text.into(),
        }
    }

    /// Returns the target provider.
    #[must_use]
    pub const fn provider(&self) -> &ProviderName {
        &self.provider
    }

    /// Returns the target channel.
    #[must_use]
    pub const fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns the text body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
