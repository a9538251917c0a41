//! Port contracts for webhook ingestion.

pub mod subscription;

pub use subscription::{
    SubscriptionRepository, SubscriptionRepositoryError, SubscriptionRepositoryResult,
};
