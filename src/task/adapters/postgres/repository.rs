//! `PostgreSQL` repository implementation for task storage.

use std::collections::HashMap;

use super::models::{NewAssignmentRow, NewTaskRow, TaskRow};
use crate::identity::adapters::postgres::{UserRow, row_to_user};
use crate::identity::domain::{User, UserId};
use crate::postgres::{
    PgPool,
    schema::{task_assignments, tasks, users},
};
use crate::task::{
    domain::{
        Assignment, NewTask, PersistedTaskData, RoleTag, Task, TaskDomainError, TaskId,
        TaskStatus, TaskTitle,
    },
    ports::{RoleQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed task repository.
///
/// Deletion is soft: rows keep their identifier and are hidden by
/// `deleted_at`, so an identifier never resolves to a different task.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let participants: Vec<i64> = std::iter::once(task.author_id())
                    .chain(task.assignee_ids().iter().copied())
                    .map(UserId::value)
                    .collect();
                ensure_users_exist(tx, &participants)?;

                let draft = task.draft();
                let row = diesel::insert_into(tasks::table)
                    .values(&NewTaskRow {
                        title: draft.title().as_str().to_owned(),
                        description: draft.description().map(str::to_owned),
                        role: draft.role().map(|role| role.as_str().to_owned()),
                        status: TaskStatus::NotStarted.as_str().to_owned(),
                        author_id: task.author_id().value(),
                        created_at: task.created_at(),
                        updated_at: task.created_at(),
                    })
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)?;

                let assignments: Vec<NewAssignmentRow> = task
                    .assignee_ids()
                    .iter()
                    .map(|user_id| NewAssignmentRow {
                        task_id: row.id,
                        user_id: user_id.value(),
                        assigned_at: task.created_at(),
                    })
                    .collect();
                if !assignments.is_empty() {
                    diesel::insert_into(task_assignments::table)
                        .values(&assignments)
                        .execute(tx)?;
                }

                hydrate_one(tx, row)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            load_live_row(connection, id)?
                .map(|row| hydrate_one(connection, row))
                .transpose()
        })
        .await
    }

    async fn find_by_role(
        &self,
        role: &RoleTag,
        query: RoleQuery,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let role_label = role.as_str().to_owned();
        self.run_blocking(move |connection| {
            let mut statement = tasks::table
                .filter(tasks::deleted_at.is_null())
                .filter(tasks::role.eq(role_label))
                .select(TaskRow::as_select())
                .into_boxed();
            match query {
                RoleQuery::All => {}
                RoleQuery::Unassigned => {
                    statement = statement.filter(not(exists(
                        task_assignments::table.filter(task_assignments::task_id.eq(tasks::id)),
                    )));
                }
                RoleQuery::WithStatus(status) => {
                    statement = statement.filter(tasks::status.eq(status.as_str()));
                }
            }
            let rows = statement.load::<TaskRow>(connection)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn find_by_assignee(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::deleted_at.is_null())
                .filter(
                    tasks::id.eq_any(
                        task_assignments::table
                            .filter(task_assignments::user_id.eq(user_id.value()))
                            .select(task_assignments::task_id),
                    ),
                )
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn add_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if load_live_row(tx, task_id)?.is_none() {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }
                ensure_users_exist(tx, &[user_id.value()])?;

                let inserted = diesel::insert_into(task_assignments::table)
                    .values(&NewAssignmentRow {
                        task_id: task_id.value(),
                        user_id: user_id.value(),
                        assigned_at: at,
                    })
                    .on_conflict((task_assignments::task_id, task_assignments::user_id))
                    .do_nothing()
                    .execute(tx)?;
                if inserted > 0 {
                    touch(tx, task_id, at)?;
                }
                reload(tx, task_id)
            })
        })
        .await
    }

    async fn remove_assignment(
        &self,
        task_id: TaskId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if load_live_row(tx, task_id)?.is_none() {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }
                let removed = diesel::delete(
                    task_assignments::table
                        .filter(task_assignments::task_id.eq(task_id.value()))
                        .filter(task_assignments::user_id.eq(user_id.value())),
                )
                .execute(tx)?;
                if removed > 0 {
                    touch(tx, task_id, at)?;
                }
                reload(tx, task_id)
            })
        })
        .await
    }

    async fn update_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let row = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.value()))
                    .filter(tasks::deleted_at.is_null()),
            )
            .set((
                tasks::status.eq(status.as_str()),
                tasks::updated_at.eq(at),
            ))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection)
            .optional()?
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
            hydrate_one(connection, row)
        })
        .await
    }

    async fn delete(&self, task_id: TaskId, at: DateTime<Utc>) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.value()))
                    .filter(tasks::deleted_at.is_null()),
            )
            .set((tasks::deleted_at.eq(Some(at)), tasks::updated_at.eq(at)))
            .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }
}

fn load_live_row(
    connection: &mut PgConnection,
    task_id: TaskId,
) -> TaskRepositoryResult<Option<TaskRow>> {
    Ok(tasks::table
        .filter(tasks::id.eq(task_id.value()))
        .filter(tasks::deleted_at.is_null())
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()?)
}

fn reload(connection: &mut PgConnection, task_id: TaskId) -> TaskRepositoryResult<Task> {
    let row = load_live_row(connection, task_id)?.ok_or(TaskRepositoryError::NotFound(task_id))?;
    hydrate_one(connection, row)
}

fn touch(
    connection: &mut PgConnection,
    task_id: TaskId,
    at: DateTime<Utc>,
) -> TaskRepositoryResult<()> {
    diesel::update(tasks::table.filter(tasks::id.eq(task_id.value())))
        .set(tasks::updated_at.eq(at))
        .execute(connection)?;
    Ok(())
}

fn ensure_users_exist(connection: &mut PgConnection, ids: &[i64]) -> TaskRepositoryResult<()> {
    let found: Vec<i64> = users::table
        .filter(users::id.eq_any(ids))
        .select(users::id)
        .load(connection)?;
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => {
            let user_id =
                UserId::new(*missing).map_err(TaskRepositoryError::invalid_persisted_data)?;
            Err(TaskRepositoryError::UserNotFound(user_id))
        }
        None => Ok(()),
    }
}

fn hydrate_one(connection: &mut PgConnection, row: TaskRow) -> TaskRepositoryResult<Task> {
    let id = row.id;
    hydrate(connection, vec![row])?
        .pop()
        .ok_or_else(|| {
            TaskRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                "task {id} vanished during hydration"
            )))
        })
}

/// Loads authors and assignments for a batch of rows in two queries.
fn hydrate(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let task_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<i64> = rows.iter().map(|row| row.author_id).collect();

    let authors: HashMap<i64, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load::<UserRow>(connection)?
        .into_iter()
        .map(|row| row_to_user(row).map(|user| (user.id().value(), user)))
        .collect::<Result<_, _>>()
        .map_err(TaskRepositoryError::invalid_persisted_data)?;

    let assignment_rows: Vec<(i64, DateTime<Utc>, UserRow)> = task_assignments::table
        .inner_join(users::table)
        .filter(task_assignments::task_id.eq_any(&task_ids))
        .order(task_assignments::id.asc())
        .select((
            task_assignments::task_id,
            task_assignments::assigned_at,
            UserRow::as_select(),
        ))
        .load(connection)?;

    let mut assignments: HashMap<i64, Vec<Assignment>> = HashMap::new();
    for (task_id, assigned_at, user_row) in assignment_rows {
        let user = row_to_user(user_row).map_err(TaskRepositoryError::invalid_persisted_data)?;
        assignments
            .entry(task_id)
            .or_default()
            .push(Assignment::new(user, assigned_at));
    }

    rows.into_iter()
        .map(|row| {
            let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                TaskRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                    "task {} references missing author {}",
                    row.id, row.author_id
                )))
            })?;
            let task_assignments = assignments.remove(&row.id).unwrap_or_default();
            row_to_task(row, author, task_assignments)
                .map_err(TaskRepositoryError::invalid_persisted_data)
        })
        .collect()
}

/// Converts a task row plus hydrated participants into the domain aggregate.
fn row_to_task(
    row: TaskRow,
    author: User,
    assignments: Vec<Assignment>,
) -> Result<Task, TaskDomainError> {
    let TaskRow {
        id,
        title,
        description,
        role,
        status,
        created_at,
        updated_at,
        ..
    } = row;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id)?,
        title: TaskTitle::new(title)?,
        description,
        role: role.map(RoleTag::new).transpose()?,
        status: TaskStatus::try_from(status.as_str())?,
        author,
        assignments,
        created_at,
        updated_at,
    }))
}
