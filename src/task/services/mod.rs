//! Service layer for task lifecycle orchestration.

mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
