//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::given;
use taskrelay::identity::domain::ExternalUserId;
use taskrelay::task::domain::TaskDraft;

#[given(r#"a chat user "{external_id}" named "{name}""#)]
fn chat_user(
    world: &mut TaskLifecycleWorld,
    external_id: String,
    name: String,
) -> Result<(), eyre::Report> {
    run_async(world.store.identity().ensure_user(&external_id, &name))?;
    Ok(())
}

#[given(r#"a task titled "{title}" with role "{role}" authored by "{author}""#)]
fn existing_task(
    world: &mut TaskLifecycleWorld,
    title: String,
    role: String,
    author: String,
) -> Result<(), eyre::Report> {
    let draft = TaskDraft::new(title)?.with_role(role)?;
    let author_id = ExternalUserId::new(author)?;
    let task = run_async(world.store.create_task(draft, &author_id, &[]))?;
    world.last_task = Some(task);
    Ok(())
}
