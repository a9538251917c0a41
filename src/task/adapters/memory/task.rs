//! In-memory task repository for tests and database-free deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::identity::adapters::memory::InMemoryUserRepository;
use crate::identity::domain::UserId;
use crate::task::{
    domain::{
        Assignment, NewTask, PersistedTaskData, RoleTag, Task, TaskId, TaskStatus, TaskTitle,
    },
    ports::{RoleQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Users are read from the shared [`InMemoryUserRepository`], mirroring the
/// foreign keys of the relational schema. Clones share the same state.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    users: InMemoryUserRepository,
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    next_id: i64,
    tasks: BTreeMap<TaskId, StoredTask>,
}

#[derive(Debug, Clone)]
struct StoredTask {
    title: TaskTitle,
    description: Option<String>,
    role: Option<RoleTag>,
    status: TaskStatus,
    author_id: UserId,
    assignments: Vec<(UserId, DateTime<Utc>)>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository backed by the given user store.
    #[must_use]
    pub fn new(users: InMemoryUserRepository) -> Self {
        Self {
            users,
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
        }
    }

    /// Returns the number of live tasks.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn len(&self) -> TaskRepositoryResult<usize> {
        let state = self.read()?;
        Ok(state.tasks.len())
    }

    /// Returns `true` when no live task is stored.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn is_empty(&self) -> TaskRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> TaskRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TaskRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn user_exists(&self, id: UserId) -> TaskRepositoryResult<bool> {
        Ok(self
            .users
            .get(id)
            .map_err(TaskRepositoryError::persistence)?
            .is_some())
    }

    fn hydrate(&self, id: TaskId, stored: &StoredTask) -> TaskRepositoryResult<Task> {
        let load = |user_id: UserId| {
            self.users
                .get(user_id)
                .map_err(TaskRepositoryError::persistence)?
                .ok_or_else(|| {
                    TaskRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                        "task {id} references missing user {user_id}"
                    )))
                })
        };

        let author = load(stored.author_id)?;
        let assignments = stored
            .assignments
            .iter()
            .map(|(user_id, at)| load(*user_id).map(|user| Assignment::new(user, *at)))
            .collect::<TaskRepositoryResult<Vec<_>>>()?;

        Ok(Task::from_persisted(PersistedTaskData {
            id,
            title: stored.title.clone(),
            description: stored.description.clone(),
            role: stored.role.clone(),
            status: stored.status,
            author,
            assignments,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    fn mutate<F>(&self, task_id: TaskId, f: F) -> TaskRepositoryResult<Task>
    where
        F: FnOnce(&mut StoredTask),
    {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task_id)
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
        f(stored);
        let snapshot = stored.clone();
        drop(state);
        self.hydrate(task_id, &snapshot)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        for user_id in std::iter::once(task.author_id()).chain(task.assignee_ids().iter().copied())
        {
            if !self.user_exists(user_id)? {
                return Err(TaskRepositoryError::UserNotFound(user_id));
            }
        }

        let created_at = task.created_at();
        let stored = StoredTask {
            title: task.draft().title().clone(),
            description: task.draft().description().map(str::to_owned),
            role: task.draft().role().cloned(),
            status: TaskStatus::NotStarted,
            author_id: task.author_id(),
            assignments: task
                .assignee_ids()
                .iter()
                .map(|user_id| (*user_id, created_at))
                .collect(),
            created_at,
            updated_at: created_at,
        };

        let id = {
            let mut state = self.write()?;
            state.next_id += 1;
            let id = TaskId::new(state.next_id).map_err(TaskRepositoryError::persistence)?;
            state.tasks.insert(id, stored.clone());
            id
        };
        self.hydrate(id, &stored)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let stored = self.read()?.tasks.get(&id).cloned();
        stored.map(|task| self.hydrate(id, &task)).transpose()
    }

    async fn find_by_role(
        &self,
        role: &RoleTag,
        query: RoleQuery,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let matching: Vec<(TaskId, StoredTask)> = self
            .read()?
            .tasks
            .iter()
            .filter(|(_, task)| task.role.as_ref() == Some(role))
            .map(|(id, task)| (*id, task.clone()))
            .collect();

        let mut tasks = Vec::with_capacity(matching.len());
        for (id, stored) in matching {
            let task = self.hydrate(id, &stored)?;
            if query.matches(&task) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn find_by_assignee(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let matching: Vec<(TaskId, StoredTask)> = self
            .read()?
            .tasks
            .iter()
            .filter(|(_, task)| task.assignments.iter().any(|(id, _)| *id == user_id))
            .map(|(id, task)| (*id, task.clone()))
            .collect();

        matching
            .iter()
            .map(|(id, stored)| self.hydrate(*id, stored))
            .collect()
    }

    async fn add_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        if !self.user_exists(user_id)? {
            if self.read()?.tasks.contains_key(&task_id) {
                return Err(TaskRepositoryError::UserNotFound(user_id));
            }
            return Err(TaskRepositoryError::NotFound(task_id));
        }
        self.mutate(task_id, |stored| {
            if stored.assignments.iter().all(|(id, _)| *id != user_id) {
                stored.assignments.push((user_id, at));
                stored.updated_at = at;
            }
        })
    }

    async fn remove_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.mutate(task_id, |stored| {
            let before = stored.assignments.len();
            stored.assignments.retain(|(id, _)| *id != user_id);
            if stored.assignments.len() != before {
                stored.updated_at = at;
            }
        })
    }

    async fn update_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.mutate(task_id, |stored| {
            stored.status = status;
            stored.updated_at = at;
        })
    }

    async fn delete(&self, task_id: TaskId, _at: DateTime<Utc>) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&task_id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(task_id))
    }
}
