//! Discord bot backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::chunk::split_message;
use crate::notification::{
    domain::{ChannelId, ProviderName},
    ports::{Notifier, NotifierError, NotifierResult},
};

/// Default Discord REST endpoint.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Discord message limit. Chunks are measured in bytes, which keeps them
/// within the character limit.
const MAX_MESSAGE_LEN: usize = 2_000;

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Sends channel messages through the Discord REST API as a bot.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
    api_base: String,
    token: Option<SecretString>,
    enabled: bool,
}

impl DiscordNotifier {
    /// Creates a backend. Without a token the backend reports itself
    /// disabled.
    #[must_use]
    pub fn new(token: Option<SecretString>, enabled: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DISCORD_API_BASE.to_owned(),
            token,
            enabled,
        }
    }

    /// Points the backend at a different API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn provider(&self) -> ProviderName {
        ProviderName::discord()
    }

    fn is_enabled(&self) -> bool {
        self.enabled && self.token.is_some()
    }

    async fn send_message(&self, channel: &ChannelId, text: &str) -> NotifierResult<()> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| NotifierError::MissingToken(ProviderName::discord()))?;
        let url = format!("{}/channels/{}/messages", self.api_base, channel);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let response = self
                .client
                .post(&url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Bot {}", token.expose_secret()),
                )
                .json(&CreateMessage { content: &chunk })
                .send()
                .await
                .map_err(NotifierError::transport)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(NotifierError::Rejected {
                    provider: ProviderName::discord(),
                    channel: channel.clone(),
                    reason: format!("HTTP {status}: {body}"),
                });
            }
        }
        tracing::debug!(%channel, "delivered discord message");
        Ok(())
    }
}
