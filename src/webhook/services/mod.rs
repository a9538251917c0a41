//! Service layer for webhook ingestion.

mod ingestion;

pub use ingestion::{PushAck, WebhookError, WebhookIngestionService, WebhookResult};
