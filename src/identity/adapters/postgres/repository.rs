//! `PostgreSQL` repository implementation for user storage.

use super::models::{NewUserRow, UserRow};
use crate::identity::{
    domain::{
        DisplayName, ExternalUserId, IdentityDomainError, NewUser, PersistedUserData, User, UserId,
    },
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::postgres::{PgPool, schema::users};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserRepositoryError::persistence)?
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: NewUser) -> UserRepositoryResult<User> {
        let external_id = user.external_id().clone();
        let new_row = NewUserRow {
            external_id: user.external_id().as_str().to_owned(),
            display_name: user.display_name().as_str().to_owned(),
            created_at: user.created_at(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(users::table)
                .values(&new_row)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_external_id_unique_violation(info.as_ref()) =>
                    {
                        UserRepositoryError::DuplicateExternalId(external_id.clone())
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            row_to_user(row).map_err(UserRepositoryError::invalid_persisted_data)
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.value()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user)
                .transpose()
                .map_err(UserRepositoryError::invalid_persisted_data)
        })
        .await
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> UserRepositoryResult<Option<User>> {
        let lookup = external_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::external_id.eq(&lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user)
                .transpose()
                .map_err(UserRepositoryError::invalid_persisted_data)
        })
        .await
    }
}

/// Converts a user row into the domain aggregate.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, IdentityDomainError> {
    let UserRow {
        id,
        external_id,
        display_name,
        created_at,
    } = row;

    Ok(User::from_persisted(PersistedUserData {
        id: UserId::new(id)?,
        external_id: ExternalUserId::new(external_id)?,
        display_name: DisplayName::new(display_name)?,
        created_at,
    }))
}

fn is_external_id_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "users_external_id_key")
}
