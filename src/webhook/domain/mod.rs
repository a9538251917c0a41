//! Domain model for push events and subscriptions.

mod error;
mod format;
mod push_event;
mod signature;
mod subscription;

pub use error::{SignatureError, WebhookDomainError};
pub use format::format_push;
pub use push_event::{Commit, CommitAuthor, PushEvent, Pusher, RepositoryRef};
pub use signature::{SIGNATURE_HEADER, verify_signature};
pub use subscription::{RepositoryName, Subscription};
