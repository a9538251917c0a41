//! Task store behaviour against the `PostgreSQL` task repository.

use eyre::{Result, eyre};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskrelay::identity::domain::{ExternalUserId, User, UserId};
use taskrelay::identity::services::IdentityError;
use taskrelay::task::domain::{RoleTag, Task, TaskDraft, TaskId, TaskStatus};
use taskrelay::task::services::TaskStoreError;

use super::helpers::{PgRelay, PgStore, test_runtime};

fn ext(raw: &str) -> ExternalUserId {
    ExternalUserId::new(raw).expect("valid external id")
}

async fn onboard(store: &PgStore, external_id: &str) -> Result<User> {
    Ok(store.identity().ensure_user(external_id, external_id).await?)
}

async fn create(store: &PgStore, title: &str, role: &str) -> Result<Task> {
    let draft = TaskDraft::new(title)?.with_role(role)?;
    Ok(store.create_task(draft, &ext("u1"), &[]).await?)
}

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    let mut ids: Vec<TaskId> = tasks.iter().map(Task::id).collect();
    ids.sort();
    ids
}

#[rstest]
fn padded_fields_round_trip_through_postgres(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        onboard(&relay.store, "u1").await?;
        let draft = TaskDraft::new(" Wire harness ")?
            .with_description("  ")
            .with_role("electrical ")?;

        let created = relay.store.create_task(draft, &ext("u1"), &[]).await?;
        let fetched = relay.store.get_task(created.id()).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.title().as_str(), " Wire harness ");
        assert_eq!(fetched.description(), Some("  "));
        assert_eq!(fetched.role().map(RoleTag::as_str), Some("electrical "));
        assert_eq!(fetched.status(), TaskStatus::NotStarted);
        assert!(relay.store.get_tasks_by_role("electrical").await?.is_empty());
        Ok(())
    })
}

#[rstest]
fn role_queries_return_exact_subsets(shared_test_cluster: &'static TestCluster) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        onboard(&relay.store, "u1").await?;
        let helper = onboard(&relay.store, "u2").await?;
        let open = create(&relay.store, "Open", "ops").await?;
        let taken = create(&relay.store, "Taken", "ops").await?;
        let done = create(&relay.store, "Done", "ops").await?;
        create(&relay.store, "Shouting", "Ops").await?;
        create(&relay.store, "Padded", " ops").await?;
        relay.store.assign(taken.id(), helper.id()).await?;
        relay.store.update_status(done.id(), "Completed").await?;

        let by_role = relay.store.get_tasks_by_role("ops").await?;
        let unassigned = relay.store.get_unassigned_tasks_by_role("ops").await?;
        let completed = relay.store.get_completed_tasks_by_role("ops").await?;

        assert_eq!(ids(&by_role), vec![open.id(), taken.id(), done.id()]);
        let expected: Vec<Task> = by_role
            .iter()
            .filter(|task| task.is_unassigned())
            .cloned()
            .collect();
        assert_eq!(ids(&unassigned), ids(&expected));
        assert_eq!(ids(&unassigned), vec![open.id(), done.id()]);
        assert_eq!(ids(&completed), vec![done.id()]);
        Ok(())
    })
}

#[rstest]
fn deleted_tasks_disappear_and_ids_are_not_reused(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        onboard(&relay.store, "u1").await?;
        let helper = onboard(&relay.store, "u2").await?;
        let doomed = create(&relay.store, "Doomed", "ops").await?;
        relay.store.assign(doomed.id(), helper.id()).await?;

        relay.store.delete_task(doomed.id()).await?;

        assert!(matches!(
            relay.store.get_task(doomed.id()).await,
            Err(TaskStoreError::TaskNotFound(id)) if id == doomed.id()
        ));
        assert!(relay.store.get_tasks_by_role("ops").await?.is_empty());
        assert!(relay.store.get_assigned_tasks(&ext("u2")).await?.is_empty());
        assert!(matches!(
            relay.store.delete_task(doomed.id()).await,
            Err(TaskStoreError::TaskNotFound(_))
        ));
        assert!(matches!(
            relay.store.assign(doomed.id(), helper.id()).await,
            Err(TaskStoreError::TaskNotFound(_))
        ));

        let next = create(&relay.store, "Next", "ops").await?;
        assert!(next.id() > doomed.id());
        Ok(())
    })
}

#[rstest]
fn repeated_assignment_keeps_a_single_row(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        onboard(&relay.store, "u1").await?;
        let helper = onboard(&relay.store, "u2").await?;
        let bystander = onboard(&relay.store, "u3").await?;
        let task = create(&relay.store, "Loom", "electrical").await?;

        relay.store.assign(task.id(), helper.id()).await?;
        let again = relay.store.assign(task.id(), helper.id()).await?;
        assert_eq!(again.assignments().len(), 1);
        assert_eq!(relay.store.list_assignees(task.id()).await?, vec![helper.clone()]);

        let untouched = relay.store.unassign(task.id(), bystander.id()).await?;
        assert_eq!(untouched.assignments().len(), 1);

        let cleared = relay.store.unassign(task.id(), helper.id()).await?;
        assert!(cleared.is_unassigned());
        assert!(relay.store.get_assigned_tasks(&ext("u2")).await?.is_empty());
        Ok(())
    })
}

#[rstest]
fn unknown_ids_are_reported_without_writes(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let author = onboard(&relay.store, "u1").await?;
        let task = create(&relay.store, "Loom", "electrical").await?;
        let missing_task = TaskId::new(task.id().value() + 100)?;
        let missing_user = UserId::new(author.id().value() + 100)?;

        assert!(matches!(
            relay.store.assign(missing_task, author.id()).await,
            Err(TaskStoreError::TaskNotFound(id)) if id == missing_task
        ));
        assert!(matches!(
            relay.store.assign(task.id(), missing_user).await,
            Err(TaskStoreError::UserIdNotFound(id)) if id == missing_user
        ));
        assert!(matches!(
            relay.store.update_status(missing_task, "Completed").await,
            Err(TaskStoreError::TaskNotFound(_))
        ));
        assert!(relay.store.get_task(task.id()).await?.is_unassigned());
        Ok(())
    })
}

#[rstest]
fn unknown_assignee_aborts_the_whole_create(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        onboard(&relay.store, "u1").await?;
        let draft = TaskDraft::new("Loom")?.with_role("electrical")?;

        let result = relay
            .store
            .create_task(draft, &ext("u1"), &[ext("ghost")])
            .await;

        let err = result.err().ok_or_else(|| eyre!("unknown assignee must fail"))?;
        assert!(matches!(
            err,
            TaskStoreError::Identity(IdentityError::UserNotFound(_))
        ));
        assert!(relay.store.get_tasks_by_role("electrical").await?.is_empty());
        Ok(())
    })
}

#[rstest]
fn duplicate_and_author_assignees_collapse(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let author = onboard(&relay.store, "u1").await?;
        let helper = onboard(&relay.store, "u2").await?;
        let draft = TaskDraft::new("Loom")?;

        let task = relay
            .store
            .create_task(draft, &ext("u1"), &[ext("u2"), ext("u1"), ext("u2")])
            .await?;

        let mut assignees: Vec<UserId> = task.assignees().map(User::id).collect();
        assignees.sort();
        assert_eq!(assignees, vec![author.id(), helper.id()]);
        assert_eq!(relay.store.get_task(task.id()).await?, task);
        Ok(())
    })
}
