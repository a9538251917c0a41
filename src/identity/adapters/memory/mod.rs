//! In-memory adapters for identity persistence.

mod user;

pub use user::InMemoryUserRepository;
