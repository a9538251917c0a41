//! Service layer mapping chat platform identities onto internal users.

use crate::error::ErrorKind;
use crate::identity::{
    domain::{DisplayName, ExternalUserId, IdentityDomainError, NewUser, User},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for identity resolution.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// No user exists for the external identifier.
    #[error("user {0} not found")]
    UserNotFound(ExternalUserId),

    /// A concurrent insert for the same external identifier won the race but
    /// its row could not be read back. Retrying the call is safe.
    #[error("concurrent registration of user {0}, retry")]
    Conflict(ExternalUserId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

impl IdentityError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) | Self::Repository(UserRepositoryError::DuplicateExternalId(_)) => {
                ErrorKind::Conflict
            }
            Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for identity service operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Resolves chat platform users to internal user records.
pub struct IdentityResolver<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for IdentityResolver<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> IdentityResolver<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new identity resolver.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the user for `external_id`, creating it on first sight.
    ///
    /// An existing user is returned unchanged; the display name is not
    /// re-synced. When a concurrent call inserts the same identifier first,
    /// the winner's row is re-read and returned.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Domain`] for blank inputs,
    /// [`IdentityError::Conflict`] when the race loser cannot re-read the
    /// winning row, or [`IdentityError::Repository`] on persistence failure.
    pub async fn ensure_user(
        &self,
        raw_external_id: &str,
        raw_display_name: &str,
    ) -> IdentityResult<User> {
        let external_id = ExternalUserId::new(raw_external_id)?;
        let display_name = DisplayName::new(raw_display_name)?;

        if let Some(existing) = self.repository.find_by_external_id(&external_id).await? {
            return Ok(existing);
        }

        let new_user = NewUser::new(external_id.clone(), display_name, &*self.clock);
        match self.repository.insert(new_user).await {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id(),
                    external_id = %user.external_id(),
                    "registered new user"
                );
                Ok(user)
            }
            Err(UserRepositoryError::DuplicateExternalId(_)) => {
                tracing::debug!(%external_id, "lost user registration race, re-reading");
                self.repository
                    .find_by_external_id(&external_id)
                    .await?
                    .ok_or(IdentityError::Conflict(external_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Looks up an existing user without creating one.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UserNotFound`] when the identifier is unknown.
    pub async fn resolve(&self, external_id: &ExternalUserId) -> IdentityResult<User> {
        self.repository
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(external_id.clone()))
    }

    /// Returns the underlying repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}
