//! Embedded `PostgreSQL` wiring shared by the adapter tests.
//!
//! Each test gets its own database cloned from a template that already
//! carries the schema, so tests never see each other's rows.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use taskrelay::identity::{adapters::postgres::PostgresUserRepository, services::IdentityResolver};
use taskrelay::notification::{
    adapters::RecordingNotifier,
    domain::ProviderName,
    services::NotificationRouter,
};
use taskrelay::postgres::{CREATE_TABLES_SQL, PgPool, build_pool};
use taskrelay::task::{adapters::postgres::PostgresTaskRepository, services::TaskStore};
use taskrelay::webhook::{
    adapters::postgres::PostgresSubscriptionRepository, services::WebhookIngestionService,
};
use tokio::runtime::Runtime;

/// Boxed error used by the setup helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Task store over the `PostgreSQL` repositories.
pub type PgStore = TaskStore<PostgresTaskRepository, PostgresUserRepository, DefaultClock>;

/// Webhook service over the `PostgreSQL` subscription repository.
pub type PgWebhooks = WebhookIngestionService<PostgresSubscriptionRepository, DefaultClock>;

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "taskrelay_test_template";

/// Connections per test database. More than one so concurrent units of
/// work really overlap.
const POOL_SIZE: u32 = 4;

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TABLES_SQL)
                .map_err(|e| eyre::eyre!("schema bootstrap failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Drops the test database even if the test panics.
struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Services wired over a private database.
///
/// Field order matters: everything holding a pool handle drops before the
/// guard removes the database.
pub struct PgRelay {
    pub store: PgStore,
    pub webhooks: PgWebhooks,
    pub users: PostgresUserRepository,
    pub discord: RecordingNotifier,
    pub pool: PgPool,
    _guard: CleanupGuard,
}

impl PgRelay {
    /// Clones the template into a fresh database and wires the services.
    pub fn start(cluster: &'static TestCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let db_name = format!("taskrelay_test_{}", uuid::Uuid::new_v4().simple());
        cluster
            .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
            .map_err(|e| Box::new(e) as BoxError)?;
        let guard = CleanupGuard { cluster, db_name };

        let url = cluster.connection().database_url(&guard.db_name);
        let pool = build_pool(&url, POOL_SIZE)?;
        let clock = Arc::new(DefaultClock);
        let users = PostgresUserRepository::new(pool.clone());
        let discord = RecordingNotifier::new(ProviderName::discord());
        let router = NotificationRouter::new().with_backend(Arc::new(discord.clone()));

        let identity = IdentityResolver::new(Arc::new(users.clone()), Arc::clone(&clock));
        let store = TaskStore::new(
            Arc::new(PostgresTaskRepository::new(pool.clone())),
            identity,
            Arc::clone(&clock),
        );
        let webhooks = WebhookIngestionService::new(
            Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            router,
            ProviderName::discord(),
            clock,
        );
        Ok(Self {
            store,
            webhooks,
            users,
            discord,
            pool,
            _guard: guard,
        })
    }
}
