//! Port contracts for identity resolution.

pub mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
