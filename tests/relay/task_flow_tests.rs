//! Task store flows across identity and task repositories.

use eyre::Result;
use rstest::rstest;
use taskrelay::error::ErrorKind;
use taskrelay::identity::domain::ExternalUserId;
use taskrelay::task::{domain::TaskDraft, services::TaskStoreError};

use super::helpers::{Relay, relay};

fn external(value: &str) -> ExternalUserId {
    ExternalUserId::new(value).expect("valid external id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignment_survives_round_trip_through_queries(relay: Relay) -> Result<()> {
    relay.store.identity().ensure_user("u1", "Ada").await?;
    let grace = relay.store.identity().ensure_user("u2", "Grace").await?;
    let draft = TaskDraft::new("Crimp terminals")?.with_role("electrical")?;

    let task = relay
        .store
        .create_task(draft, &external("u1"), &[external("u2")])
        .await?;

    let unassigned = relay.store.get_unassigned_tasks_by_role("electrical").await?;
    assert!(unassigned.is_empty());
    let assigned = relay.store.get_assigned_tasks(&external("u2")).await?;
    assert_eq!(
        assigned.iter().map(|found| found.id()).collect::<Vec<_>>(),
        vec![task.id()]
    );

    relay.store.unassign(task.id(), grace.id()).await?;

    let unassigned_after = relay.store.get_unassigned_tasks_by_role("electrical").await?;
    assert_eq!(unassigned_after.len(), 1);
    assert!(relay.store.get_assigned_tasks(&external("u2")).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_assignee_leaves_nothing_behind(relay: Relay) -> Result<()> {
    relay.store.identity().ensure_user("u1", "Ada").await?;
    let draft = TaskDraft::new("Orphaned")?.with_role("electrical")?;

    let err = relay
        .store
        .create_task(draft, &external("u1"), &[external("ghost")])
        .await
        .expect_err("unknown assignee must fail");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(relay.tasks.is_empty()?);
    assert!(relay.store.get_tasks_by_role("electrical").await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_ids_are_never_reused(relay: Relay) -> Result<()> {
    relay.store.identity().ensure_user("u1", "Ada").await?;
    let first = relay
        .store
        .create_task(TaskDraft::new("First")?.with_role("mech")?, &external("u1"), &[])
        .await?;

    relay.store.delete_task(first.id()).await?;
    let second = relay
        .store
        .create_task(TaskDraft::new("Second")?.with_role("mech")?, &external("u1"), &[])
        .await?;

    assert!(second.id() > first.id());
    assert!(matches!(
        relay.store.get_task(first.id()).await,
        Err(TaskStoreError::TaskNotFound(id)) if id == first.id()
    ));
    let remaining = relay.store.get_tasks_by_role("mech").await?;
    assert_eq!(
        remaining.iter().map(|task| task.id()).collect::<Vec<_>>(),
        vec![second.id()]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_moves_freely_in_both_directions(relay: Relay) -> Result<()> {
    relay.store.identity().ensure_user("u1", "Ada").await?;
    let task = relay
        .store
        .create_task(TaskDraft::new("Loom")?.with_role("electrical")?, &external("u1"), &[])
        .await?;

    for status in ["Completed", "Not Started", "In Progress", "Completed"] {
        let updated = relay.store.update_status(task.id(), status).await?;
        assert_eq!(updated.status().as_str(), status);
    }

    let completed = relay.store.get_completed_tasks_by_role("electrical").await?;
    assert_eq!(completed.len(), 1);
    Ok(())
}
