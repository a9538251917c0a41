//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::when;
use taskrelay::identity::domain::ExternalUserId;
use taskrelay::task::domain::TaskDraft;

#[when(r#""{author}" creates a task titled "{title}" with role "{role}""#)]
fn create_task(
    world: &mut TaskLifecycleWorld,
    author: String,
    title: String,
    role: String,
) -> Result<(), eyre::Report> {
    let draft = TaskDraft::new(title)?.with_role(role)?;
    let author_id = ExternalUserId::new(author)?;
    let result = run_async(world.store.create_task(draft, &author_id, &[]));
    if let Ok(ref created) = result {
        world.last_task = Some(created.clone());
    }
    world.last_create_result = Some(result);
    Ok(())
}

#[when(r#"the task status is updated to "{status}""#)]
fn update_status(world: &mut TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let result = run_async(world.store.update_status(task_id, &status));
    let refreshed = run_async(world.store.get_task(task_id))?;
    world.last_task = Some(refreshed);
    world.last_update_result = Some(result);
    Ok(())
}
