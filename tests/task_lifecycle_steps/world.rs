//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskrelay::identity::{adapters::memory::InMemoryUserRepository, services::IdentityResolver};
use taskrelay::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskStore, TaskStoreError},
};

/// Store type used by the BDD world.
pub type TestTaskStore = TaskStore<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub store: TestTaskStore,
    pub last_task: Option<Task>,
    pub last_create_result: Option<Result<Task, TaskStoreError>>,
    pub last_update_result: Option<Result<Task, TaskStoreError>>,
}

impl TaskLifecycleWorld {
    /// Creates a world backed by empty in-memory repositories.
    #[must_use]
    pub fn new() -> Self {
        let users = InMemoryUserRepository::new();
        let tasks = InMemoryTaskRepository::new(users.clone());
        let clock = Arc::new(DefaultClock);
        let identity = IdentityResolver::new(Arc::new(users), Arc::clone(&clock));

        Self {
            store: TaskStore::new(Arc::new(tasks), identity, clock),
            last_task: None,
            last_create_result: None,
            last_update_result: None,
        }
    }

    /// Returns the task the scenario is working on.
    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
