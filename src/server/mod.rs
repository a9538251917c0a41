//! HTTP surface.
//!
//! - `POST /webhooks/github` verifies the `X-Hub-Signature-256` header and
//!   relays push events to subscribed channels.
//! - `POST /commands` runs a chat command on behalf of a platform bridge,
//!   guarded by a bearer token.
//! - `GET /healthz` reports liveness.

mod auth;
mod handlers;

use axum::Router;
use axum::routing::{get, post};
use mockable::Clock;
use secrecy::SecretString;

use crate::command::services::CommandHandler;
use crate::identity::ports::UserRepository;
use crate::task::ports::TaskRepository;
use crate::webhook::{ports::SubscriptionRepository, services::WebhookIngestionService};

pub use auth::CommandToken;
pub use handlers::{CommandEnvelope, CommandResponse, EnvelopeUser};

/// Shared state behind every route.
pub struct AppState<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    commands: CommandHandler<T, U, S, C>,
    webhooks: WebhookIngestionService<S, C>,
    webhook_secret: SecretString,
    command_token: CommandToken,
}

impl<T, U, S, C> Clone for AppState<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            webhooks: self.webhooks.clone(),
            webhook_secret: self.webhook_secret.clone(),
            command_token: self.command_token.clone(),
        }
    }
}

impl<T, U, S, C> AppState<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    /// Creates the route state.
    #[must_use]
    pub fn new(
        commands: CommandHandler<T, U, S, C>,
        webhooks: WebhookIngestionService<S, C>,
        webhook_secret: SecretString,
        command_token: &SecretString,
    ) -> Self {
        Self {
            commands,
            webhooks,
            webhook_secret,
            command_token: CommandToken::new(command_token),
        }
    }
}

/// Builds the service router.
#[must_use]
pub fn router<T, U, S, C>(state: AppState<T, U, S, C>) -> Router
where
    T: TaskRepository + 'static,
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/webhooks/github", post(handlers::github_webhook::<T, U, S, C>))
        .route("/commands", post(handlers::run_command::<T, U, S, C>))
        .with_state(state)
}
