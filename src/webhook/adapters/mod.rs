//! Adapter implementations of the webhook ports.

pub mod memory;
pub mod postgres;
