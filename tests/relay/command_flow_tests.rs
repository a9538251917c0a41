//! Chat commands driving the relay end to end.

use eyre::Result;
use rstest::rstest;
use taskrelay::identity::domain::ExternalUserId;
use taskrelay::task::domain::TaskId;

use super::helpers::{Relay, context, relay, with_user};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_create_commands_register_every_participant(relay: Relay) -> Result<()> {
    let first = with_user(context(("u1", "Ada"), "general"), ("u2", "Grace"));
    let second = with_user(context(("u3", "Linus"), "general"), ("u4", "Margaret"));

    let (left, right) = tokio::join!(
        relay
            .handler
            .handle_text(&first, "/create-task title=Loom role=electrical assignee=<@u2>"),
        relay
            .handler
            .handle_text(&second, "/create-task title=Bracket role=mech assignee=<@u4>"),
    );

    assert!(left.is_success(), "{}", left.text);
    assert!(right.is_success(), "{}", right.text);
    assert_eq!(relay.users.len()?, 4);
    assert_eq!(relay.tasks.len()?, 2);

    for (assignee, role) in [("u2", "electrical"), ("u4", "mech")] {
        let assigned = relay
            .store
            .get_assigned_tasks(&ExternalUserId::new(assignee)?)
            .await?;
        let roles: Vec<String> = assigned
            .iter()
            .filter_map(|task| task.role().map(ToString::to_string))
            .collect();
        assert_eq!(roles, vec![role.to_owned()]);
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commands_walk_a_task_through_its_lifecycle(relay: Relay) -> Result<()> {
    let ada = with_user(context(("u1", "Ada"), "general"), ("u2", "Grace"));

    let created = relay
        .handler
        .handle_text(&ada, r#"/create-task title="Wire harness" role=electrical"#)
        .await;
    assert_eq!(created.text, "Created task #1: Wire harness");

    let assigned = relay
        .handler
        .handle_text(&ada, "/assign-task task-id=1 user=<@u2>")
        .await;
    assert_eq!(assigned.text, "Assigned Grace to task #1.");

    let updated = relay
        .handler
        .handle_text(&ada, r#"/update-task-status task-id=1 status="In Progress""#)
        .await;
    assert_eq!(updated.text, "Task #1 status set to In Progress.");

    let task = relay.store.get_task(TaskId::new(1)?).await?;
    assert_eq!(task.status().as_str(), "In Progress");
    assert_eq!(
        task.assignees()
            .map(|user| user.external_id().as_str().to_owned())
            .collect::<Vec<_>>(),
        vec!["u2".to_owned()]
    );

    let notices: Vec<String> = relay
        .discord
        .deliveries()
        .into_iter()
        .map(|delivery| delivery.text)
        .collect();
    assert!(notices.iter().any(|text| text.contains("New task #1")));
    assert!(notices.iter().any(|text| text.contains("is now In Progress")));
    assert!(relay.slack.deliveries().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_commands_leave_state_untouched(relay: Relay) -> Result<()> {
    let ada = context(("u1", "Ada"), "general");
    relay
        .handler
        .handle_text(&ada, "/create-task title=Loom role=electrical")
        .await;

    let reply = relay
        .handler
        .handle_text(&ada, "/update-task-status task-id=1 status=Done")
        .await;

    assert!(!reply.is_success());
    let task = relay.store.get_task(TaskId::new(1)?).await?;
    assert_eq!(task.status().as_str(), "Not Started");
    Ok(())
}
