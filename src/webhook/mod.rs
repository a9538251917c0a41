//! Repository push-event relay.
//!
//! A push event is parsed, rendered into a fixed-layout chat message and
//! handed to the notification router once per channel subscribed to the
//! repository. Subscriptions live behind the
//! [`ports::SubscriptionRepository`] port.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
