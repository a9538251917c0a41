//! In-memory user repository for tests and database-free deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{ExternalUserId, NewUser, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    next_id: i64,
    users: HashMap<UserId, User>,
    external_index: HashMap<ExternalUserId, UserId>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn len(&self) -> UserRepositoryResult<usize> {
        let state = self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.users.len())
    }

    /// Returns `true` when no user has been stored.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn is_empty(&self) -> UserRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Synchronous lookup used by sibling in-memory adapters for hydration.
    pub(crate) fn get(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> UserRepositoryResult<User> {
        let mut state = self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;

        if state.external_index.contains_key(user.external_id()) {
            return Err(UserRepositoryError::DuplicateExternalId(
                user.external_id().clone(),
            ));
        }

        state.next_id += 1;
        let id = UserId::new(state.next_id).map_err(UserRepositoryError::persistence)?;
        let stored = user.into_user(id);
        state
            .external_index
            .insert(stored.external_id().clone(), id);
        state.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.get(id)
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let user = state
            .external_index
            .get(external_id)
            .and_then(|id| state.users.get(id))
            .cloned();
        Ok(user)
    }
}
