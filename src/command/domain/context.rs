//! Who invoked a command, where, and which users the platform resolved.

use std::collections::BTreeMap;

use crate::identity::domain::{DisplayName, ExternalUserId, IdentityDomainError};
use crate::notification::domain::ChannelId;

/// A chat platform user as delivered with an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    external_id: ExternalUserId,
    display_name: DisplayName,
}

impl ChatUser {
    /// Creates a validated chat user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError`] for blank values.
    pub fn new(
        external_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, IdentityDomainError> {
        Ok(Self {
            external_id: ExternalUserId::new(external_id)?,
            display_name: DisplayName::new(display_name)?,
        })
    }

    /// Returns the platform identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalUserId {
        &self.external_id
    }

    /// Returns the platform display name.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}

/// Invocation context passed alongside every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    invoker: ChatUser,
    channel: ChannelId,
    resolved: BTreeMap<String, ChatUser>,
}

impl CommandContext {
    /// Creates a context for `invoker` acting in `channel`.
    #[must_use]
    pub const fn new(invoker: ChatUser, channel: ChannelId) -> Self {
        Self {
            invoker,
            channel,
            resolved: BTreeMap::new(),
        }
    }

    /// Adds a user the platform resolved for a user option.
    #[must_use]
    pub fn with_user(mut self, user: ChatUser) -> Self {
        self.resolved
            .insert(user.external_id().as_str().to_owned(), user);
        self
    }

    /// Returns the invoking user.
    #[must_use]
    pub const fn invoker(&self) -> &ChatUser {
        &self.invoker
    }

    /// Returns the channel the command was issued in.
    #[must_use]
    pub const fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Looks up a user option value.
    ///
    /// Accepts a bare identifier or a `<@id>` / `<@!id>` mention. The
    /// invoker always resolves.
    #[must_use]
    pub fn user(&self, reference: &str) -> Option<&ChatUser> {
        let trimmed = reference.trim();
        let id = trimmed
            .strip_prefix("<@")
            .and_then(|rest| rest.strip_suffix('>'))
            .map_or(trimmed, |inner| inner.trim_start_matches('!'));
        if self.invoker.external_id().as_str() == id {
            return Some(&self.invoker);
        }
        self.resolved.get(id)
    }
}
