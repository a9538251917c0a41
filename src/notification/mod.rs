//! Multi-provider notification fan-out.
//!
//! Outbound messages name the provider they are meant for. The
//! [`services::NotificationRouter`] hands each message to the registered
//! backend with that name, skipping disabled backends and isolating failures
//! so one bad channel never blocks another.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
