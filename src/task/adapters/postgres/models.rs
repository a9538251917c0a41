//! Diesel row models for task persistence.

use crate::postgres::schema::{task_assignments, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: i64,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional role tag.
    pub role: Option<String>,
    /// Status label.
    pub status: String,
    /// Author user identifier.
    pub author_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional role tag.
    pub role: Option<String>,
    /// Status label.
    pub status: String,
    /// Author user identifier.
    pub author_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for assignment links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_assignments)]
pub struct NewAssignmentRow {
    /// Assigned task.
    pub task_id: i64,
    /// Assigned user.
    pub user_id: i64,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}
