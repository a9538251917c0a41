//! Shared wiring for in-memory flow tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskrelay::command::{
    domain::{ChatUser, CommandContext},
    services::CommandHandler,
};
use taskrelay::identity::{adapters::memory::InMemoryUserRepository, services::IdentityResolver};
use taskrelay::notification::{
    adapters::RecordingNotifier,
    domain::{ChannelId, ProviderName},
    services::NotificationRouter,
};
use taskrelay::task::{adapters::memory::InMemoryTaskRepository, services::TaskStore};
use taskrelay::webhook::{
    adapters::memory::InMemorySubscriptionRepository, services::WebhookIngestionService,
};

/// Task store over in-memory repositories.
pub type TestStore = TaskStore<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// Webhook service over an in-memory subscription repository.
pub type TestWebhooks = WebhookIngestionService<InMemorySubscriptionRepository, DefaultClock>;

/// Command handler over in-memory repositories.
pub type TestHandler = CommandHandler<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    InMemorySubscriptionRepository,
    DefaultClock,
>;

/// Fully wired relay with recording notifiers for both providers.
pub struct Relay {
    pub store: TestStore,
    pub webhooks: TestWebhooks,
    pub handler: TestHandler,
    pub users: InMemoryUserRepository,
    pub tasks: InMemoryTaskRepository,
    pub discord: RecordingNotifier,
    pub slack: RecordingNotifier,
}

/// Builds a relay that addresses its messages to Discord.
#[fixture]
pub fn relay() -> Relay {
    let clock = Arc::new(DefaultClock);
    let users = InMemoryUserRepository::new();
    let tasks = InMemoryTaskRepository::new(users.clone());
    let discord = RecordingNotifier::new(ProviderName::discord());
    let slack = RecordingNotifier::new(ProviderName::slack());
    let router = NotificationRouter::new()
        .with_backend(Arc::new(discord.clone()))
        .with_backend(Arc::new(slack.clone()));

    let identity = IdentityResolver::new(Arc::new(users.clone()), Arc::clone(&clock));
    let store = TaskStore::new(Arc::new(tasks.clone()), identity, Arc::clone(&clock));
    let webhooks = WebhookIngestionService::new(
        Arc::new(InMemorySubscriptionRepository::new()),
        router.clone(),
        ProviderName::discord(),
        clock,
    );
    let handler = CommandHandler::new(
        store.clone(),
        webhooks.clone(),
        router,
        ProviderName::discord(),
    );

    Relay {
        store,
        webhooks,
        handler,
        users,
        tasks,
        discord,
        slack,
    }
}

/// Builds a command context for `invoker` in `channel`.
pub fn context(invoker: (&str, &str), channel: &str) -> CommandContext {
    CommandContext::new(
        ChatUser::new(invoker.0, invoker.1).expect("valid invoker"),
        ChannelId::new(channel).expect("valid channel"),
    )
}

/// Adds a resolvable platform user to `context`.
pub fn with_user(context: CommandContext, user: (&str, &str)) -> CommandContext {
    context.with_user(ChatUser::new(user.0, user.1).expect("valid user"))
}

/// Push payload for repository `harness` with one commit.
pub const PUSH_PAYLOAD: &str = r#"{
    "ref": "refs/heads/main",
    "forced": false,
    "repository": { "name": "harness", "full_name": "acme/harness" },
    "pusher": { "name": "ada" },
    "commits": [
        {
            "id": "c3",
            "message": "Add strain relief\n\nDetails follow",
            "timestamp": "2026-10-02T08:00:00Z",
            "url": "https://example.com/acme/harness/commit/c3",
            "author": { "name": "Ada" }
        }
    ]
}"#;
