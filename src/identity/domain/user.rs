//! User aggregate.

use super::{DisplayName, ExternalUserId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Internal record for a chat platform user.
///
/// Users are created lazily on first reference and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    external_id: ExternalUserId,
    display_name: DisplayName,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted internal identifier.
    pub id: UserId,
    /// Persisted external identifier.
    pub external_id: ExternalUserId,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            external_id: data.external_id,
            display_name: data.display_name,
            created_at: data.created_at,
        }
    }

    /// Returns the internal identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the chat platform identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalUserId {
        &self.external_id
    }

    /// Returns the display name captured when the user was first seen.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    external_id: ExternalUserId,
    display_name: DisplayName,
    created_at: DateTime<Utc>,
}

impl NewUser {
    /// Prepares a user for insertion.
    #[must_use]
    pub fn new(external_id: ExternalUserId, display_name: DisplayName, clock: &impl Clock) -> Self {
        Self {
            external_id,
            display_name,
            created_at: clock.utc(),
        }
    }

    /// Returns the chat platform identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalUserId {
        &self.external_id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Completes the record with the identifier assigned by persistence.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            external_id: self.external_id,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}
