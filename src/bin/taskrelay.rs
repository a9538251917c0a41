//! Task relay service.
//!
//! Reads [`RelayConfig`] from the environment, selects `PostgreSQL` or
//! in-memory persistence, registers the Discord and Slack backends, and
//! serves the HTTP surface until interrupted.

use std::sync::Arc;

use mockable::DefaultClock;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use taskrelay::command::services::CommandHandler;
use taskrelay::config::RelayConfig;
use taskrelay::identity::{
    adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository},
    ports::UserRepository,
    services::IdentityResolver,
};
use taskrelay::notification::{
    adapters::{DiscordNotifier, SlackNotifier},
    services::NotificationRouter,
};
use taskrelay::postgres::{apply_schema, build_pool};
use taskrelay::server::{AppState, router};
use taskrelay::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
    services::TaskStore,
};
use taskrelay::webhook::{
    adapters::{memory::InMemorySubscriptionRepository, postgres::PostgresSubscriptionRepository},
    ports::SubscriptionRepository,
    services::WebhookIngestionService,
};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    let notifications = notification_router(&config);

    if let Some(url) = &config.database_url {
        let pool = build_pool(url.expose_secret(), config.db_pool_size)?;
        apply_schema(&pool).await?;
        tracing::info!("using PostgreSQL persistence");
        serve(
            &config,
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresTaskRepository::new(pool.clone())),
            Arc::new(PostgresSubscriptionRepository::new(pool)),
            notifications,
        )
        .await
    } else {
        tracing::warn!("TASKRELAY_DATABASE_URL unset, using in-memory persistence");
        let users = InMemoryUserRepository::new();
        let tasks = InMemoryTaskRepository::new(users.clone());
        serve(
            &config,
            Arc::new(users),
            Arc::new(tasks),
            Arc::new(InMemorySubscriptionRepository::new()),
            notifications,
        )
        .await
    }
}

fn notification_router(config: &RelayConfig) -> NotificationRouter {
    NotificationRouter::new()
        .with_backend(Arc::new(DiscordNotifier::new(
            config.discord.token.clone(),
            config.discord.enabled,
        )))
        .with_backend(Arc::new(SlackNotifier::new(
            config.slack.token.clone(),
            config.slack.enabled,
        )))
}

async fn serve<U, T, S>(
    config: &RelayConfig,
    users: Arc<U>,
    tasks: Arc<T>,
    subscriptions: Arc<S>,
    notifications: NotificationRouter,
) -> Result<(), BoxError>
where
    U: UserRepository + 'static,
    T: TaskRepository + 'static,
    S: SubscriptionRepository + 'static,
{
    let clock = Arc::new(DefaultClock);
    let identity = IdentityResolver::new(users, Arc::clone(&clock));
    let store = TaskStore::new(tasks, identity, Arc::clone(&clock));
    let webhooks = WebhookIngestionService::new(
        subscriptions,
        notifications.clone(),
        config.chat_provider.clone(),
        clock,
    );
    let commands = CommandHandler::new(
        store,
        webhooks.clone(),
        notifications,
        config.chat_provider.clone(),
    );
    let state = AppState::new(
        commands,
        webhooks,
        config.webhook_secret.clone(),
        &config.command_token,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, provider = %config.chat_provider, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await?;
    tracing::info!("shut down");
    Ok(())
}
