//! Slack bot backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::chunk::split_message;
use crate::notification::{
    domain::{ChannelId, ProviderName},
    ports::{Notifier, NotifierError, NotifierResult},
};

/// Default Slack Web API endpoint.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

const MAX_MESSAGE_LEN: usize = 40_000;

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts messages through Slack's `chat.postMessage`.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    api_base: String,
    token: Option<SecretString>,
    enabled: bool,
}

impl SlackNotifier {
    /// Creates a backend. Without a token the backend reports itself
    /// disabled.
    #[must_use]
    pub fn new(token: Option<SecretString>, enabled: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: SLACK_API_BASE.to_owned(),
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

    fn rejected(channel: &ChannelId, reason: String) -> NotifierError {
        NotifierError::Rejected {
            provider: ProviderName::slack(),
            channel: channel.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn provider(&self) -> ProviderName {
        ProviderName::slack()
    }

    fn is_enabled(&self) -> bool {
        self.enabled && self.token.is_some()
    }

    async fn send_message(&self, channel: &ChannelId, text: &str) -> NotifierResult<()> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| NotifierError::MissingToken(ProviderName::slack()))?;
        let url = format!("{}/chat.postMessage", self.api_base);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let response = self
                .client
                .post(&url)
                .bearer_auth(token.expose_secret())
                .json(&PostMessage {
                    channel: channel.as_str(),
                    text: &chunk,
                })
                .send()
                .await
                .map_err(NotifierError::transport)?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::rejected(channel, format!("HTTP {status}")));
            }
            // Slack reports most failures with HTTP 200 and `ok: false`.
            let body: SlackResponse = response.json().await.map_err(NotifierError::transport)?;
            if !body.ok {
                let reason = body.error.unwrap_or_else(|| "unknown".to_owned());
                return Err(Self::rejected(channel, reason));
            }
        }
        tracing::debug!(%channel, "delivered slack message");
        Ok(())
    }
}
