//! Domain model for chat platform identities.

mod error;
mod ids;
mod user;

pub use error::IdentityDomainError;
pub use ids::{DisplayName, ExternalUserId, UserId};
pub use user::{NewUser, PersistedUserData, User};
