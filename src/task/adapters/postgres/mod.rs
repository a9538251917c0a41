//! `PostgreSQL` task adapter.

mod models;
mod repository;

pub use repository::PostgresTaskRepository;
