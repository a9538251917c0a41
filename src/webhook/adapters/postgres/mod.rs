//! `PostgreSQL` subscription adapter.

mod models;
mod repository;

pub use repository::PostgresSubscriptionRepository;
