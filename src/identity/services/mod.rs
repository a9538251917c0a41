//! Application services for identity resolution.

mod resolver;

pub use resolver::{IdentityError, IdentityResolver, IdentityResult};
