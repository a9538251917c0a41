//! Subscriptions managed by command, relayed by push events.

use eyre::Result;
use rstest::rstest;
use taskrelay::notification::domain::ChannelId;

use super::helpers::{PUSH_PAYLOAD, Relay, context, relay};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribed_channels_receive_rendered_push(relay: Relay) -> Result<()> {
    relay
        .handler
        .handle_text(&context(("u1", "Ada"), "general"), "/subscribe repository=harness")
        .await;
    relay
        .handler
        .handle_text(&context(("u1", "Ada"), "builds"), "/subscribe repository=harness")
        .await;

    let ack = relay.webhooks.on_push_event(PUSH_PAYLOAD.as_bytes()).await?;

    assert_eq!(ack.subscriptions, 2);
    assert_eq!(ack.delivered, 2);
    assert_eq!(ack.failed, 0);
    let deliveries = relay.discord.deliveries();
    assert_eq!(deliveries.len(), 2);
    for delivery in &deliveries {
        assert!(delivery.text.starts_with("[harness] push to main by ada"));
        assert!(delivery.text.contains("- Add strain relief ("));
        assert!(!delivery.text.contains("Details follow"));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_channel_does_not_block_the_rest(relay: Relay) -> Result<()> {
    for channel in ["c-1", "c-2"] {
        relay.webhooks.subscribe("harness", channel).await?;
    }
    relay.discord.fail_channel(ChannelId::new("c-1")?);

    let ack = relay.webhooks.on_push_event(PUSH_PAYLOAD.as_bytes()).await?;

    assert_eq!(ack.delivered, 1);
    assert_eq!(ack.failed, 1);
    let channels: Vec<String> = relay
        .discord
        .deliveries()
        .iter()
        .map(|delivery| delivery.channel.to_string())
        .collect();
    assert_eq!(channels, vec!["c-2".to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unsubscribed_channel_stops_receiving(relay: Relay) -> Result<()> {
    let general = context(("u1", "Ada"), "general");
    relay
        .handler
        .handle_text(&general, "/subscribe repository=harness")
        .await;
    let reply = relay
        .handler
        .handle_text(&general, "/unsubscribe repository=harness")
        .await;
    assert_eq!(reply.text, "Unsubscribed channel general from harness.");

    let ack = relay.webhooks.on_push_event(PUSH_PAYLOAD.as_bytes()).await?;

    assert_eq!(ack.subscriptions, 0);
    assert!(relay.discord.deliveries().is_empty());
    Ok(())
}
