//! `PostgreSQL` repository implementation for subscriptions.

use super::models::{NewRepositoryRow, NewSubscriptionRow, SubscriptionRow};
use crate::notification::domain::ChannelId;
use crate::postgres::{
    PgPool,
    schema::{repositories, subscriptions},
};
use crate::webhook::{
    domain::{RepositoryName, Subscription},
    ports::{SubscriptionRepository, SubscriptionRepositoryError, SubscriptionRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed subscription repository.
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SubscriptionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SubscriptionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SubscriptionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SubscriptionRepositoryError::persistence)?
    }
}

impl From<diesel::result::Error> for SubscriptionRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn subscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
        at: DateTime<Utc>,
    ) -> SubscriptionRepositoryResult<Subscription> {
        let name = repository.as_str().to_owned();
        let target = channel.as_str().to_owned();
        self.run_blocking(move |connection| {
            connection.transaction::<_, SubscriptionRepositoryError, _>(|tx| {
                diesel::insert_into(repositories::table)
                    .values(&NewRepositoryRow {
                        name: name.clone(),
                        created_at: at,
                    })
                    .on_conflict(repositories::name)
                    .do_nothing()
                    .execute(tx)?;
                let repository_id: i64 = repositories::table
                    .filter(repositories::name.eq(&name))
                    .select(repositories::id)
                    .first(tx)?;

                diesel::insert_into(subscriptions::table)
                    .values(&NewSubscriptionRow {
                        repository_id,
                        channel: target.clone(),
                        created_at: at,
                    })
                    .on_conflict((subscriptions::repository_id, subscriptions::channel))
                    .do_nothing()
                    .execute(tx)?;

                let row = subscriptions::table
                    .inner_join(repositories::table)
                    .filter(subscriptions::repository_id.eq(repository_id))
                    .filter(subscriptions::channel.eq(&target))
                    .select((
                        repositories::name,
                        subscriptions::channel,
                        subscriptions::created_at,
                    ))
                    .first::<SubscriptionRow>(tx)?;
                row_to_subscription(row)
            })
        })
        .await
    }

    async fn unsubscribe(
        &self,
        repository: &RepositoryName,
        channel: &ChannelId,
    ) -> SubscriptionRepositoryResult<bool> {
        let name = repository.as_str().to_owned();
        let target = channel.as_str().to_owned();
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                subscriptions::table
                    .filter(subscriptions::channel.eq(target))
                    .filter(
                        subscriptions::repository_id.eq_any(
                            repositories::table
                                .filter(repositories::name.eq(name))
                                .select(repositories::id),
                        ),
                    ),
            )
            .execute(connection)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn find_by_repository(
        &self,
        repository: &RepositoryName,
    ) -> SubscriptionRepositoryResult<Vec<Subscription>> {
        let name = repository.as_str().to_owned();
        self.run_blocking(move |connection| {
            subscriptions::table
                .inner_join(repositories::table)
                .filter(repositories::name.eq(name))
                .order(subscriptions::id.asc())
                .select((
                    repositories::name,
                    subscriptions::channel,
                    subscriptions::created_at,
                ))
                .load::<SubscriptionRow>(connection)?
                .into_iter()
                .map(row_to_subscription)
                .collect()
        })
        .await
    }

    async fn list_all(&self) -> SubscriptionRepositoryResult<Vec<Subscription>> {
        self.run_blocking(move |connection| {
            subscriptions::table
                .inner_join(repositories::table)
                .order(subscriptions::id.asc())
                .select((
                    repositories::name,
                    subscriptions::channel,
                    subscriptions::created_at,
                ))
                .load::<SubscriptionRow>(connection)?
                .into_iter()
                .map(row_to_subscription)
                .collect()
        })
        .await
    }
}

fn row_to_subscription(row: SubscriptionRow) -> SubscriptionRepositoryResult<Subscription> {
    let repository = RepositoryName::new(row.repository)
        .map_err(SubscriptionRepositoryError::invalid_persisted_data)?;
    let channel =
        ChannelId::new(row.channel).map_err(SubscriptionRepositoryError::invalid_persisted_data)?;
    Ok(Subscription::new(repository, channel, row.created_at))
}
