//! Unit tests for webhook ingestion.


/// Representative push payload with two commits.
pub(super) const PUSH_PAYLOAD: &str = r#"{
    "ref": "refs/heads/main",
    "forced": false,
    "repository": { "name": "harness", "full_name": "acme/harness" },
    "pusher": { "name": "ada", "email": "ada@example.com" },
    "commits": [
        {
            "id": "a1",
            "message": "Route rear loom\n\nLonger body text",
            "timestamp": "2026-10-01T09:30:00+02:00",
            "url": "https://example.com/acme/harness/commit/a1",
            "author": { "name": "Ada", "email": "ada@example.com" }
        },
        {
            "id": "b2",
            "message": "Fix connector pinout",
            "timestamp": "2026-10-01T10:00:00+02:00",
            "url": "https://example.com/acme/harness/commit/b2",
            "author": { "name": "Grace" }
        }
    ]
}"#;
