//! Port contracts for task persistence.

pub mod repository;

pub use repository::{RoleQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
