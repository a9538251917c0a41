//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::then;
use taskrelay::error::ErrorKind;
use taskrelay::identity::services::IdentityError;
use taskrelay::task::services::TaskStoreError;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.status();
    if actual.as_str() != status {
        return Err(eyre::eyre!("expected status {status}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the task role is "{role}""#)]
fn task_role_is(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.role().map(|tag| tag.as_str().to_owned());
    if actual.as_deref() != Some(role.as_str()) {
        return Err(eyre::eyre!("expected role {role}, found {actual:?}"));
    }
    Ok(())
}

#[then("the task has {count:usize} assignments")]
fn task_assignment_count(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.assignments().len();
    if actual != count {
        return Err(eyre::eyre!("expected {count} assignments, found {actual}"));
    }
    Ok(())
}

#[then(r#"the task author is "{external_id}""#)]
fn task_author_is(world: &TaskLifecycleWorld, external_id: String) -> Result<(), eyre::Report> {
    let author = world.current_task()?.author();
    if author.external_id().as_str() != external_id {
        return Err(eyre::eyre!(
            "expected author {external_id}, found {}",
            author.external_id()
        ));
    }
    Ok(())
}

#[then(r#"role "{role}" lists the task"#)]
fn role_includes_task(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let tasks = run_async(world.store.get_tasks_by_role(&role))?;
    if !tasks.iter().any(|task| task.id() == task_id) {
        return Err(eyre::eyre!("task {task_id} missing from role {role}"));
    }
    Ok(())
}

#[then(r#"role "{role}" does not list the task"#)]
fn role_excludes_task(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let tasks = run_async(world.store.get_tasks_by_role(&role))?;
    if tasks.iter().any(|task| task.id() == task_id) {
        return Err(eyre::eyre!("task {task_id} unexpectedly listed for role {role}"));
    }
    Ok(())
}

#[then(r#"role "{role}" lists no tasks"#)]
fn role_is_empty(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.store.get_tasks_by_role(&role))?;
    if !tasks.is_empty() {
        return Err(eyre::eyre!("expected no tasks for role {role}, found {}", tasks.len()));
    }
    Ok(())
}

#[then(r#"completed tasks for role "{role}" include the task"#)]
fn completed_includes_task(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let tasks = run_async(world.store.get_completed_tasks_by_role(&role))?;
    if !tasks.iter().any(|task| task.id() == task_id) {
        return Err(eyre::eyre!("task {task_id} missing from completed {role} tasks"));
    }
    Ok(())
}

#[then(r#"completed tasks for role "{role}" exclude the task"#)]
fn completed_excludes_task(world: &TaskLifecycleWorld, role: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let tasks = run_async(world.store.get_completed_tasks_by_role(&role))?;
    if tasks.iter().any(|task| task.id() == task_id) {
        return Err(eyre::eyre!(
            "task {task_id} unexpectedly listed as completed for role {role}"
        ));
    }
    Ok(())
}

#[then("the update is rejected as invalid")]
fn update_rejected(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;
    match result {
        Err(err) if err.kind() == ErrorKind::Validation => Ok(()),
        other => Err(eyre::eyre!("expected a validation error, got {other:?}")),
    }
}

#[then("task creation fails because the user is unknown")]
fn creation_fails_for_unknown_user(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result"))?;
    if !matches!(
        result,
        Err(TaskStoreError::Identity(IdentityError::UserNotFound(_)))
    ) {
        return Err(eyre::eyre!("expected UserNotFound error, got {result:?}"));
    }
    Ok(())
}
