//! `PostgreSQL` adapters for user persistence.

mod models;
mod repository;

pub(crate) use models::UserRow;
pub use repository::PostgresUserRepository;
pub(crate) use repository::row_to_user;
