//! Executes typed commands and renders text replies.

use futures::future::try_join_all;
use minijinja::{Environment, context};
use mockable::Clock;
use serde::Serialize;
use thiserror::Error;

use crate::command::domain::{
    ChatUser, CommandContext, CommandError, CreateTaskArgs, RoleListing, TaskCommand,
};
use crate::error::ErrorKind;
use crate::identity::{domain::User, ports::UserRepository, services::IdentityError};
use crate::notification::{
    domain::{OutboundMessage, ProviderName},
    services::NotificationRouter,
};
use crate::task::{
    domain::{RoleTag, Task, TaskId, TaskStatus},
    ports::TaskRepository,
    services::{TaskStore, TaskStoreError},
};
use crate::webhook::{
    ports::SubscriptionRepository,
    services::{WebhookError, WebhookIngestionService},
};

const TASK_TEMPLATE: &str = "\
Task #{{ task.id }}: {{ task.title }}
Status: {{ task.status }}
{% if task.role %}Role: {{ task.role }}
{% endif %}{% if task.description %}Description: {{ task.description }}
{% endif %}Author: {{ task.author }}
Assignees: {% if task.assignees %}{{ task.assignees | join(\", \") }}{% else %}none{% endif %}
";

const TASK_LIST_TEMPLATE: &str = "\
{{ heading }}
{% for task in tasks %}- #{{ task.id }} {{ task.title }} [{{ task.status }}]\
{% if task.assignees %} assigned to {{ task.assignees | join(\", \") }}{% endif %}
{% endfor %}";

/// Errors raised while executing a command.
#[derive(Debug, Error)]
pub enum CommandHandlerError {
    /// Command text or options are invalid.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A participant could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The task store rejected the operation.
    #[error(transparent)]
    Task(#[from] TaskStoreError),

    /// Subscription management failed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// A reply template failed to render.
    #[error("failed to render reply: {0}")]
    Render(String),
}

impl CommandHandlerError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Command(err) => err.kind(),
            Self::Identity(err) => err.kind(),
            Self::Task(err) => err.kind(),
            Self::Webhook(err) => err.kind(),
            Self::Render(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for command execution.
pub type CommandHandlerResult<T> = Result<T, CommandHandlerError>;

/// Text reply for the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Rendered response text.
    pub text: String,
    /// Failure category, absent on success.
    pub error: Option<ErrorKind>,
}

impl CommandReply {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    fn failure(err: &CommandHandlerError) -> Self {
        let kind = err.kind();
        let text = match kind {
            ErrorKind::NotFound => format!("Not found: {err}"),
            ErrorKind::Internal => {
                tracing::error!(error = %err, "command failed");
                "Error: something went wrong, please try again later".to_owned()
            }
            ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Delivery => {
                format!("Error: {err}")
            }
        };
        Self {
            text,
            error: Some(kind),
        }
    }

    /// Returns `true` when the command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize)]
struct TaskView {
    id: i64,
    title: String,
    status: &'static str,
    role: Option<String>,
    description: Option<String>,
    author: String,
    assignees: Vec<String>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().value(),
            title: task.title().to_string(),
            status: task.status().as_str(),
            role: task.role().map(ToString::to_string),
            description: task.description().map(str::to_owned),
            author: task.author().display_name().to_string(),
            assignees: task
                .assignees()
                .map(|user| user.display_name().to_string())
                .collect(),
        }
    }
}

/// Command surface over the task store and subscription management.
pub struct CommandHandler<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    tasks: TaskStore<T, U, C>,
    webhooks: WebhookIngestionService<S, C>,
    router: NotificationRouter,
    provider: ProviderName,
}

impl<T, U, S, C> Clone for CommandHandler<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            webhooks: self.webhooks.clone(),
            router: self.router.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<T, U, S, C> CommandHandler<T, U, S, C>
where
    T: TaskRepository,
    U: UserRepository + 'static,
    S: SubscriptionRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a handler. Notices go to `provider` in the invoking channel.
    #[must_use]
    pub const fn new(
        tasks: TaskStore<T, U, C>,
        webhooks: WebhookIngestionService<S, C>,
        router: NotificationRouter,
        provider: ProviderName,
    ) -> Self {
        Self {
            tasks,
            webhooks,
            router,
            provider,
        }
    }

    /// Parses raw command text and executes it.
    pub async fn handle_text(&self, context: &CommandContext, raw_input: &str) -> CommandReply {
        match TaskCommand::parse(raw_input, context) {
            Ok(command) => self.handle(context, command).await,
            Err(err) => CommandReply::failure(&err.into()),
        }
    }

    /// Executes a validated command and renders the reply.
    pub async fn handle(&self, context: &CommandContext, command: TaskCommand) -> CommandReply {
        self.execute(context, command).await.map_or_else(
            |err| {
                tracing::debug!(error = %err, kind = %err.kind(), "command rejected");
                CommandReply::failure(&err)
            },
            CommandReply::success,
        )
    }

    /// Executes a validated command, returning the success text.
    ///
    /// # Errors
    ///
    /// Returns [`CommandHandlerError`] when the underlying service fails.
    pub async fn execute(
        &self,
        context: &CommandContext,
        command: TaskCommand,
    ) -> CommandHandlerResult<String> {
        match command {
            TaskCommand::CreateTask(args) => self.create_task(context, args).await,
            TaskCommand::GetTask { task_id } => {
                let task = self.tasks.get_task(task_id).await?;
                render_task(&task)
            }
            TaskCommand::TasksByRole { role, listing } => self.tasks_by_role(&role, listing).await,
            TaskCommand::AssignTask { task_id, user } => {
                // Unknown tasks must not register the assignee as a side effect.
                self.tasks.get_task(task_id).await?;
                let assignee = self.ensure(&user).await?;
                self.tasks.assign(task_id, assignee.id()).await?;
                Ok(format!(
                    "Assigned {} to task #{task_id}.",
                    assignee.display_name()
                ))
            }
            TaskCommand::UnassignTask { task_id, user } => self.unassign(task_id, &user).await,
            TaskCommand::UpdateTaskStatus { task_id, status } => {
                self.update_status(context, task_id, status).await
            }
            TaskCommand::ListTaskAssignees { task_id } => {
                let assignees = self.tasks.list_assignees(task_id).await?;
                Ok(render_assignees(task_id, &assignees))
            }
            TaskCommand::AssignedTasks => self.assigned_tasks(context.invoker()).await,
            TaskCommand::Subscribe {
                repository,
                channel,
            } => {
                self.webhooks
                    .subscribe(repository.as_str(), channel.as_str())
                    .await?;
                Ok(format!(
                    "Subscribed channel {channel} to push events from {repository}."
                ))
            }
            TaskCommand::Unsubscribe {
                repository,
                channel,
            } => {
                let removed = self
                    .webhooks
                    .unsubscribe(repository.as_str(), channel.as_str())
                    .await?;
                Ok(if removed {
                    format!("Unsubscribed channel {channel} from {repository}.")
                } else {
                    format!("Channel {channel} was not subscribed to {repository}.")
                })
            }
        }
    }

    async fn ensure(&self, user: &ChatUser) -> CommandHandlerResult<User> {
        Ok(self
            .tasks
            .identity()
            .ensure_user(user.external_id().as_str(), user.display_name().as_str())
            .await?)
    }

    async fn create_task(
        &self,
        context: &CommandContext,
        args: CreateTaskArgs,
    ) -> CommandHandlerResult<String> {
        let invoker = context.invoker();
        let mut participants = vec![invoker];
        participants.extend(args.assignee.as_ref());
        try_join_all(participants.iter().map(|user| self.ensure(user))).await?;

        let assignees: Vec<_> = args
            .assignee
            .iter()
            .map(|user| user.external_id().clone())
            .collect();
        let task = self
            .tasks
            .create_task(args.draft, invoker.external_id(), &assignees)
            .await?;

        self.notify(
            context,
            format!(
                "New task #{} \"{}\" created by {}",
                task.id(),
                task.title(),
                invoker.display_name()
            ),
        )
        .await;
        Ok(format!("Created task #{}: {}", task.id(), task.title()))
    }

    async fn tasks_by_role(
        &self,
        role: &RoleTag,
        listing: RoleListing,
    ) -> CommandHandlerResult<String> {
        let (tasks, heading) = match listing {
            RoleListing::All => (
                self.tasks.get_tasks_by_role(role.as_str()).await?,
                format!("Tasks with role {role}:"),
            ),
            RoleListing::Unassigned => (
                self.tasks.get_unassigned_tasks_by_role(role.as_str()).await?,
                format!("Unassigned tasks with role {role}:"),
            ),
            RoleListing::Completed => (
                self.tasks.get_completed_tasks_by_role(role.as_str()).await?,
                format!("Completed tasks with role {role}:"),
            ),
        };
        if tasks.is_empty() {
            return Ok(format!("No tasks found for role {role}."));
        }
        render_task_list(&heading, tasks)
    }

    async fn unassign(&self, task_id: TaskId, user: &ChatUser) -> CommandHandlerResult<String> {
        match self.tasks.identity().resolve(user.external_id()).await {
            Ok(known) => {
                self.tasks.unassign(task_id, known.id()).await?;
            }
            Err(IdentityError::UserNotFound(_)) => {
                // Never seen, so never assigned; still report unknown tasks.
                self.tasks.get_task(task_id).await?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(format!(
            "Unassigned {} from task #{task_id}.",
            user.display_name()
        ))
    }

    async fn update_status(
        &self,
        context: &CommandContext,
        task_id: TaskId,
        status: TaskStatus,
    ) -> CommandHandlerResult<String> {
        let task = self.tasks.update_status(task_id, status.as_str()).await?;
        self.notify(
            context,
            format!(
                "Task #{} \"{}\" is now {} ({})",
                task.id(),
                task.title(),
                task.status(),
                context.invoker().display_name()
            ),
        )
        .await;
        Ok(format!("Task #{task_id} status set to {}.", task.status()))
    }

    async fn assigned_tasks(&self, invoker: &ChatUser) -> CommandHandlerResult<String> {
        let tasks = match self.tasks.get_assigned_tasks(invoker.external_id()).await {
            Ok(found) => found,
            Err(TaskStoreError::Identity(IdentityError::UserNotFound(_))) => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        if tasks.is_empty() {
            return Ok("You have no assigned tasks.".to_owned());
        }
        render_task_list("Your assigned tasks:", tasks)
    }

    async fn notify(&self, context: &CommandContext, text: String) {
        let message = OutboundMessage::new(self.provider.clone(), context.channel().clone(), text);
        let report = self.router.broadcast(&[message]).await;
        if !report.is_clean() {
            tracing::warn!(
                channel = %context.channel(),
                failures = report.failures.len(),
                "command notice was not delivered"
            );
        }
    }
}

fn render_task(task: &Task) -> CommandHandlerResult<String> {
    let rendered = Environment::new()
        .render_str(TASK_TEMPLATE, context! { task => TaskView::from(task) })
        .map_err(|err| CommandHandlerError::Render(err.to_string()))?;
    Ok(rendered.trim_end().to_owned())
}

fn render_task_list(heading: &str, mut tasks: Vec<Task>) -> CommandHandlerResult<String> {
    tasks.sort_by_key(Task::id);
    let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
    let rendered = Environment::new()
        .render_str(TASK_LIST_TEMPLATE, context! { heading, tasks => views })
        .map_err(|err| CommandHandlerError::Render(err.to_string()))?;
    Ok(rendered.trim_end().to_owned())
}

fn render_assignees(task_id: TaskId, assignees: &[User]) -> String {
    if assignees.is_empty() {
        return format!("Task #{task_id} has no assignees.");
    }
    let lines: Vec<String> = assignees
        .iter()
        .map(|user| format!("- {} ({})", user.display_name(), user.external_id()))
        .collect();
    format!("Assignees of task #{task_id}:\n{}", lines.join("\n"))
}
