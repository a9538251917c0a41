//! Subscriptions and push relay against the `PostgreSQL` subscription
//! repository.

use eyre::Result;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskrelay::postgres::apply_schema;

use super::helpers::{PgRelay, test_runtime};

const PUSH_PAYLOAD: &str = r#"{
    "ref": "refs/heads/main",
    "forced": false,
    "repository": { "name": "harness", "full_name": "acme/harness" },
    "pusher": { "name": "ada" },
    "commits": [
        {
            "id": "c3",
            "message": "Add strain relief",
            "timestamp": "2026-10-02T08:00:00Z",
            "url": "https://example.com/acme/harness/commit/c3",
            "author": { "name": "Ada" }
        }
    ]
}"#;

#[rstest]
fn subscribing_twice_keeps_the_original_binding(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let first = relay.webhooks.subscribe("harness", "general").await?;
        let second = relay.webhooks.subscribe("harness", "general").await?;

        assert_eq!(second.created_at(), first.created_at());
        assert_eq!(relay.webhooks.list_subscriptions().await?.len(), 1);
        Ok(())
    })
}

#[rstest]
fn unsubscribe_reports_whether_a_binding_existed(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        relay.webhooks.subscribe("harness", "general").await?;
        relay.webhooks.subscribe("harness", "builds").await?;

        assert!(relay.webhooks.unsubscribe("harness", "general").await?);
        assert!(!relay.webhooks.unsubscribe("harness", "general").await?);
        assert!(!relay.webhooks.unsubscribe("loom", "builds").await?);

        let remaining = relay.webhooks.list_subscriptions().await?;
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|sub| sub.channel().as_str() == "builds"));
        Ok(())
    })
}

#[rstest]
fn push_reaches_only_exact_repository_matches(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        relay.webhooks.subscribe("harness", "general").await?;
        relay.webhooks.subscribe("Harness", "shouting").await?;
        relay.webhooks.subscribe("acme/harness", "full-name").await?;

        let ack = relay.webhooks.on_push_event(PUSH_PAYLOAD.as_bytes()).await?;

        assert_eq!(ack.subscriptions, 1);
        assert_eq!(ack.delivered, 1);
        let channels: Vec<String> = relay
            .discord
            .deliveries()
            .iter()
            .map(|delivery| delivery.channel.to_string())
            .collect();
        assert_eq!(channels, vec!["general".to_owned()]);
        Ok(())
    })
}

#[rstest]
fn schema_bootstrap_is_idempotent(shared_test_cluster: &'static TestCluster) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        relay.webhooks.subscribe("harness", "general").await?;

        apply_schema(&relay.pool).await?;
        apply_schema(&relay.pool).await?;

        assert_eq!(relay.webhooks.list_subscriptions().await?.len(), 1);
        Ok(())
    })
}
