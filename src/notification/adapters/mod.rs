//! Notifier backends.

mod chunk;
pub mod discord;
pub mod memory;
pub mod slack;

pub use discord::DiscordNotifier;
pub use memory::{RecordedDelivery, RecordingNotifier};
pub use slack::SlackNotifier;
