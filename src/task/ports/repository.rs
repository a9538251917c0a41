//! Repository port for task persistence and role-scoped queries.

use crate::identity::domain::UserId;
use crate::task::domain::{NewTask, RoleTag, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Filter applied on top of an exact role match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleQuery {
    /// Every live task with the role.
    All,
    /// Tasks with the role and zero assignments.
    Unassigned,
    /// Tasks with the role and the given status.
    WithStatus(TaskStatus),
}

impl RoleQuery {
    /// Returns `true` when a task with the role satisfies the filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Unassigned => task.is_unassigned(),
            Self::WithStatus(status) => task.status() == status,
        }
    }
}

/// Task persistence contract.
///
/// Every read returns fully hydrated tasks (author and assignments with their
/// users). Deleted tasks are invisible to every operation.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task with its author and assignments atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::UserNotFound`] when the author or an
    /// assignee does not exist. No task row is persisted in that case.
    async fn insert(&self, task: NewTask) -> TaskRepositoryResult<Task>;

    /// Finds a live task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns live tasks whose role equals `role` exactly and that satisfy
    /// `query`. Ordering is unspecified.
    async fn find_by_role(&self, role: &RoleTag, query: RoleQuery)
    -> TaskRepositoryResult<Vec<Task>>;

    /// Returns live tasks the user is assigned to.
    async fn find_by_assignee(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Assigns a user to a task. Assigning an already assigned user is a
    /// no-op that still returns the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] for an unknown task and
    /// [`TaskRepositoryError::UserNotFound`] for an unknown user.
    async fn add_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Removes the user's assignment if present.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] for an unknown task.
    async fn remove_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Overwrites the status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] for an unknown task.
    async fn update_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Deletes a task. Its identifier is never handed out again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] for an unknown task.
    async fn delete(&self, task_id: TaskId, at: DateTime<Utc>) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task does not exist or was deleted.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// A referenced user does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a data-quality error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
