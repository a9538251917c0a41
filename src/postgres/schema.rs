//! Diesel schema shared by the `PostgreSQL` adapters.

diesel::table! {
    /// Chat platform users known to the relay.
    users (id) {
        /// Internal user identifier.
        id -> Int8,
        /// Chat platform user identifier.
        #[max_length = 255]
        external_id -> Varchar,
        /// Display name captured on first sight.
        #[max_length = 255]
        display_name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Int8,
        /// Task title.
        title -> Text,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Optional role tag used for filtering.
        role -> Nullable<Text>,
        /// Task status label.
        #[max_length = 32]
        status -> Varchar,
        /// Owning author.
        author_id -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Links between tasks and assigned users.
    task_assignments (id) {
        /// Row identifier, preserving insertion order.
        id -> Int8,
        /// Assigned task.
        task_id -> Int8,
        /// Assigned user.
        user_id -> Int8,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Repositories that have at least once been subscribed to.
    repositories (id) {
        /// Row identifier.
        id -> Int8,
        /// Repository name as reported by push events.
        #[max_length = 255]
        name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Repository-to-channel notification bindings.
    subscriptions (id) {
        /// Row identifier.
        id -> Int8,
        /// Subscribed repository.
        repository_id -> Int8,
        /// Destination channel identifier.
        #[max_length = 255]
        channel -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> users (author_id));
diesel::joinable!(task_assignments -> tasks (task_id));
diesel::joinable!(task_assignments -> users (user_id));
diesel::joinable!(subscriptions -> repositories (repository_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tasks,
    task_assignments,
    repositories,
    subscriptions,
);
