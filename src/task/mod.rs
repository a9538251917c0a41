//! Task tracking for chat communities.
//!
//! Members create tasks, assign and unassign each other, move tasks between
//! the three status values, and query tasks by role tag. The module follows
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
