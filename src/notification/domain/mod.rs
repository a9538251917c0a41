//! Domain types for outbound notifications.

mod message;

pub use message::{ChannelId, NotificationDomainError, OutboundMessage, ProviderName};
