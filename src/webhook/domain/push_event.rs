//! Push-event payload.
//!
//! Only the fields the relay renders are modelled; everything else in the
//! payload is ignored. A missing modelled field makes the payload malformed.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::WebhookDomainError;

const BRANCH_PREFIX: &str = "refs/heads/";

/// A repository push.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushEvent {
    /// Pushed repository.
    pub repository: RepositoryRef,
    /// Full ref that was pushed, such as `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Who pushed.
    pub pusher: Pusher,
    /// Whether the push rewrote history.
    pub forced: bool,
    /// Pushed commits in payload order.
    pub commits: Vec<Commit>,
}

/// Repository section of a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryRef {
    /// Repository name.
    pub name: String,
}

/// Pusher section of a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pusher {
    /// Pusher display name.
    pub name: String,
}

/// One pushed commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    /// Full commit message.
    pub message: String,
    /// Commit timestamp.
    pub timestamp: DateTime<FixedOffset>,
    /// Link to the commit.
    pub url: String,
    /// Commit author.
    pub author: CommitAuthor,
}

/// Author section of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitAuthor {
    /// Author display name.
    pub name: String,
}

impl PushEvent {
    /// Parses a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookDomainError::MalformedPayload`] for invalid JSON or a
    /// missing field.
    pub fn parse(raw: &[u8]) -> Result<Self, WebhookDomainError> {
        serde_json::from_slice(raw)
            .map_err(|err| WebhookDomainError::MalformedPayload(err.to_string()))
    }

    /// Returns the branch name for `refs/heads/` refs and the full ref
    /// otherwise.
    #[must_use]
    pub fn branch(&self) -> &str {
        self.git_ref
            .strip_prefix(BRANCH_PREFIX)
            .unwrap_or(&self.git_ref)
    }
}

impl Commit {
    /// Returns the first line of the commit message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim_end()
    }
}
