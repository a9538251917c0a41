//! Identity resolution for chat platform users.
//!
//! Maps external chat-platform user identifiers onto internal user records,
//! creating a record the first time an identifier is seen. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
