//! Domain model for tasks and assignments.
//!
//! A task has exactly one author, fixed at creation, and any number of
//! assignees. Status is a free three-valued flag rather than a directed
//! workflow.

mod error;
mod ids;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{RoleTag, TaskId, TaskTitle};
pub use status::TaskStatus;
pub use task::{Assignment, NewTask, PersistedTaskData, Task, TaskDraft};
