//! Diesel row models for user persistence.

use crate::postgres::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: i64,
    /// Chat platform identifier.
    pub external_id: String,
    /// Display name.
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// Chat platform identifier.
    pub external_id: String,
    /// Display name.
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
