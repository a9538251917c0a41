//! Task lifecycle orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::error::ErrorKind;
use crate::identity::{
    domain::{ExternalUserId, User, UserId},
    ports::UserRepository,
    services::{IdentityError, IdentityResolver},
};
use crate::task::{
    domain::{NewTask, RoleTag, Task, TaskDomainError, TaskDraft, TaskId, TaskStatus},
    ports::{RoleQuery, TaskRepository, TaskRepositoryError},
};

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A participant could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The task does not exist or was deleted.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The referenced internal user does not exist.
    #[error("user {0} not found")]
    UserIdNotFound(UserId),

    /// A participant resolution was cancelled before reporting an outcome.
    #[error("participant resolution was interrupted")]
    Interrupted,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskStoreError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::TaskNotFound(id),
            TaskRepositoryError::UserNotFound(id) => Self::UserIdNotFound(id),
            other => Self::Repository(other),
        }
    }
}

impl TaskStoreError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::Identity(err) => err.kind(),
            Self::TaskNotFound(_) | Self::UserIdNotFound(_) => ErrorKind::NotFound,
            Self::Interrupted | Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Owns the task lifecycle: creation, assignment, status and queries.
pub struct TaskStore<T, U, C>
where
    T: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    identity: IdentityResolver<U, C>,
    clock: Arc<C>,
}

impl<T, U, C> Clone for TaskStore<T, U, C>
where
    T: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            identity: self.identity.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, U, C> TaskStore<T, U, C>
where
    T: TaskRepository,
    U: UserRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a task store.
    #[must_use]
    pub const fn new(tasks: Arc<T>, identity: IdentityResolver<U, C>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            identity,
            clock,
        }
    }

    /// Returns the identity resolver used for participant lookups.
    #[must_use]
    pub const fn identity(&self) -> &IdentityResolver<U, C> {
        &self.identity
    }

    /// Creates a task authored by `author` and assigned to `assignees`.
    ///
    /// Every participant is resolved concurrently. If any resolution fails
    /// the remaining units are aborted and nothing is persisted. Duplicate
    /// assignees collapse to one assignment, and the author may also be an
    /// assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Identity`] when a participant is unknown, or
    /// a repository error when the insert fails.
    pub async fn create_task(
        &self,
        draft: TaskDraft,
        author: &ExternalUserId,
        assignees: &[ExternalUserId],
    ) -> TaskStoreResult<Task> {
        let mut participants = vec![author.clone()];
        for assignee in assignees {
            if !participants.contains(assignee) {
                participants.push(assignee.clone());
            }
        }

        let resolved = self.resolve_participants(&participants).await?;
        let lookup = |external_id: &ExternalUserId| {
            resolved
                .get(external_id)
                .map(User::id)
                .ok_or(TaskStoreError::Interrupted)
        };
        let author_id = lookup(author)?;
        let assignee_ids = assignees
            .iter()
            .map(lookup)
            .collect::<TaskStoreResult<Vec<_>>>()?;

        let task = self
            .tasks
            .insert(NewTask::new(draft, author_id, assignee_ids, self.clock.utc()))
            .await?;
        tracing::info!(
            task_id = %task.id(),
            author = %author,
            assignees = task.assignments().len(),
            "created task"
        );
        Ok(task)
    }

    /// Resolves each participant in its own unit of work.
    ///
    /// Units report exactly one outcome through the join set. Returning
    /// early drops the set, which aborts the units still running.
    async fn resolve_participants(
        &self,
        participants: &[ExternalUserId],
    ) -> TaskStoreResult<HashMap<ExternalUserId, User>> {
        let mut units = JoinSet::new();
        for external_id in participants.iter().cloned() {
            let identity = self.identity.clone();
            units.spawn(async move { identity.resolve(&external_id).await });
        }

        let mut resolved = HashMap::with_capacity(participants.len());
        while let Some(outcome) = units.join_next().await {
            let user = match outcome {
                Ok(result) => result?,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => return Err(TaskStoreError::Interrupted),
            };
            resolved.insert(user.external_id().clone(), user);
        }
        Ok(resolved)
    }

    /// Returns a fully hydrated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] for an unknown or deleted task.
    pub async fn get_task(&self, id: TaskId) -> TaskStoreResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskStoreError::TaskNotFound(id))
    }

    /// Returns every task with exactly this role, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] for an empty role.
    pub async fn get_tasks_by_role(&self, role: &str) -> TaskStoreResult<Vec<Task>> {
        self.query_role(role, RoleQuery::All).await
    }

    /// Returns tasks with this role and no assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] for an empty role.
    pub async fn get_unassigned_tasks_by_role(&self, role: &str) -> TaskStoreResult<Vec<Task>> {
        self.query_role(role, RoleQuery::Unassigned).await
    }

    /// Returns completed tasks with this role.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] for an empty role.
    pub async fn get_completed_tasks_by_role(&self, role: &str) -> TaskStoreResult<Vec<Task>> {
        self.query_role(role, RoleQuery::WithStatus(TaskStatus::Completed))
            .await
    }

    async fn query_role(&self, role: &str, query: RoleQuery) -> TaskStoreResult<Vec<Task>> {
        let tag = RoleTag::new(role)?;
        Ok(self.tasks.find_by_role(&tag, query).await?)
    }

    /// Returns tasks the user is assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Identity`] when the user is unknown.
    pub async fn get_assigned_tasks(&self, user: &ExternalUserId) -> TaskStoreResult<Vec<Task>> {
        let resolved = self.identity.resolve(user).await?;
        Ok(self.tasks.find_by_assignee(resolved.id()).await?)
    }

    /// Adds an assignee. Prior assignees are kept, and assigning someone
    /// twice leaves a single assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] or
    /// [`TaskStoreError::UserIdNotFound`] for unknown references.
    pub async fn assign(&self, task_id: TaskId, user_id: UserId) -> TaskStoreResult<Task> {
        let task = self
            .tasks
            .add_assignment(task_id, user_id, self.clock.utc())
            .await?;
        tracing::info!(%task_id, %user_id, "assigned user to task");
        Ok(task)
    }

    /// Removes an assignee. Removing a user who is not assigned succeeds
    /// without change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] for an unknown task.
    pub async fn unassign(&self, task_id: TaskId, user_id: UserId) -> TaskStoreResult<Task> {
        let task = self
            .tasks
            .remove_assignment(task_id, user_id, self.clock.utc())
            .await?;
        tracing::info!(%task_id, %user_id, "unassigned user from task");
        Ok(task)
    }

    /// Sets the status after validating it against the closed enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] for an unknown status, before
    /// anything is written, and [`TaskStoreError::TaskNotFound`] for an
    /// unknown task.
    pub async fn update_status(&self, task_id: TaskId, status: &str) -> TaskStoreResult<Task> {
        let parsed = TaskStatus::try_from(status).map_err(TaskDomainError::from)?;
        let task = self
            .tasks
            .update_status(task_id, parsed, self.clock.utc())
            .await?;
        tracing::info!(%task_id, status = %parsed, "updated task status");
        Ok(task)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] for an unknown task.
    pub async fn delete_task(&self, task_id: TaskId) -> TaskStoreResult<()> {
        self.tasks.delete(task_id, self.clock.utc()).await?;
        tracing::info!(%task_id, "deleted task");
        Ok(())
    }

    /// Returns the users assigned to a task in assignment order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] for an unknown task.
    pub async fn list_assignees(&self, task_id: TaskId) -> TaskStoreResult<Vec<User>> {
        let task = self.get_task(task_id).await?;
        Ok(task.assignees().cloned().collect())
    }
}
