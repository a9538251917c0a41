//! Diesel row models for subscription persistence.

use crate::postgres::schema::{repositories, subscriptions};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insert model for repository records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repositories)]
pub struct NewRepositoryRow {
    /// Repository name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for subscription records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscriptionRow {
    /// Subscribed repository.
    pub repository_id: i64,
    /// Destination channel.
    pub channel: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Subscription joined with its repository name.
#[derive(Debug, Clone, Queryable)]
pub struct SubscriptionRow {
    /// Repository name.
    pub repository: String,
    /// Destination channel.
    pub channel: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
