//! Task aggregate and creation inputs.

use super::{RoleTag, TaskId, TaskStatus, TaskTitle};
use crate::identity::domain::{User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    user: User,
    assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates an assignment record.
    #[must_use]
    pub const fn new(user: User, assigned_at: DateTime<Utc>) -> Self {
        Self { user, assigned_at }
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Returns when the assignment was made.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}

/// Fully hydrated task: author and assignments are always loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    role: Option<RoleTag>,
    status: TaskStatus,
    author: User,
    assignments: Vec<Assignment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted role tag.
    pub role: Option<RoleTag>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Hydrated author.
    pub author: User,
    /// Hydrated assignments in insertion order.
    pub assignments: Vec<Assignment>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            role: data.role,
            status: data.status,
            author: data.author,
            assignments: data.assignments,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the role tag, if any.
    #[must_use]
    pub const fn role(&self) -> Option<&RoleTag> {
        self.role.as_ref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &User {
        &self.author
    }

    /// Returns assignments in the order they were made.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the assigned users in assignment order.
    pub fn assignees(&self) -> impl Iterator<Item = &User> {
        self.assignments.iter().map(Assignment::user)
    }

    /// Returns `true` when the user is assigned to this task.
    #[must_use]
    pub fn is_assigned(&self, user_id: UserId) -> bool {
        self.assignees().any(|user| user.id() == user_id)
    }

    /// Returns `true` when nobody is assigned.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Caller-supplied task fields, validated before any participant is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: TaskTitle,
    description: Option<String>,
    role: Option<RoleTag>,
}

impl TaskDraft {
    /// Starts a draft with the required title.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskDomainError::EmptyTitle`] for a blank title.
    pub fn new(title: impl Into<String>) -> Result<Self, super::TaskDomainError> {
        Ok(Self {
            title: TaskTitle::new(title)?,
            description: None,
            role: None,
        })
    }

    /// Sets the description, kept exactly as given.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the role tag.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskDomainError::EmptyRole`] for a blank role.
    pub fn with_role(mut self, role: impl Into<String>) -> Result<Self, super::TaskDomainError> {
        self.role = Some(RoleTag::new(role)?);
        Ok(self)
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the role tag, if any.
    #[must_use]
    pub const fn role(&self) -> Option<&RoleTag> {
        self.role.as_ref()
    }
}

/// A task ready for insertion, with every participant already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    draft: TaskDraft,
    author_id: UserId,
    assignee_ids: Vec<UserId>,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Builds an insertion request.
    ///
    /// Duplicate assignee identifiers collapse to one, keeping first-seen
    /// order.
    #[must_use]
    pub fn new(
        draft: TaskDraft,
        author_id: UserId,
        assignee_ids: impl IntoIterator<Item = UserId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut unique = Vec::new();
        for id in assignee_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            draft,
            author_id,
            assignee_ids: unique,
            created_at,
        }
    }

    /// Returns the validated task fields.
    #[must_use]
    pub const fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    /// Returns the author identifier.
    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Returns the distinct assignee identifiers.
    #[must_use]
    pub fn assignee_ids(&self) -> &[UserId] {
        &self.assignee_ids
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
