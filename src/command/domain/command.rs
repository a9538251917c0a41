//! Typed task commands, validated once from a tokenized invocation.

use std::collections::BTreeMap;
use std::fmt;

use super::{ChatUser, CommandContext, CommandError, CommandInvocation};
use crate::notification::domain::ChannelId;
use crate::task::domain::{RoleTag, TaskDraft, TaskId, TaskStatus};
use crate::webhook::domain::RepositoryName;

/// Arguments of `/create-task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskArgs {
    /// Validated title, description and role.
    pub draft: TaskDraft,
    /// Optional assignee, resolved by the platform.
    pub assignee: Option<ChatUser>,
}

/// Which subset of a role's tasks to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleListing {
    /// Every task with the role.
    All,
    /// Tasks with the role and no assignee.
    Unassigned,
    /// Completed tasks with the role.
    Completed,
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// `/create-task title=.. [description=..] [assignee=..] [role=..]`
    CreateTask(CreateTaskArgs),
    /// `/get-task task-id=..`
    GetTask {
        /// Task to show.
        task_id: TaskId,
    },
    /// `/get-tasks-by-role`, `/unassigned-tasks-by-role` and
    /// `/completed-tasks-by-role`, all taking `role=..`.
    TasksByRole {
        /// Role to match exactly.
        role: RoleTag,
        /// Subset to list.
        listing: RoleListing,
    },
    /// `/assign-task task-id=.. user=..`
    AssignTask {
        /// Task to assign.
        task_id: TaskId,
        /// User to add.
        user: ChatUser,
    },
    /// `/unassign-task task-id=.. user=..`
    UnassignTask {
        /// Task to unassign.
        task_id: TaskId,
        /// User to remove.
        user: ChatUser,
    },
    /// `/update-task-status task-id=.. status=..`
    UpdateTaskStatus {
        /// Task to update.
        task_id: TaskId,
        /// New status.
        status: TaskStatus,
    },
    /// `/list-task-assignees task-id=..`
    ListTaskAssignees {
        /// Task whose assignees are listed.
        task_id: TaskId,
    },
    /// `/assigned-tasks`, for the invoking user.
    AssignedTasks,
    /// `/subscribe repository=.. [channel=..]`
    Subscribe {
        /// Repository whose pushes are relayed.
        repository: RepositoryName,
        /// Destination, defaulting to the invoking channel.
        channel: ChannelId,
    },
    /// `/unsubscribe repository=.. [channel=..]`
    Unsubscribe {
        /// Repository to stop relaying.
        repository: RepositoryName,
        /// Destination, defaulting to the invoking channel.
        channel: ChannelId,
    },
}

/// Names of every supported command, in help order.
pub const COMMAND_NAMES: [&str; 12] = [
    "create-task",
    "get-task",
    "get-tasks-by-role",
    "unassigned-tasks-by-role",
    "completed-tasks-by-role",
    "assign-task",
    "unassign-task",
    "update-task-status",
    "list-task-assignees",
    "assigned-tasks",
    "subscribe",
    "unsubscribe",
];

impl TaskCommand {
    /// Validates a tokenized invocation against its command's options.
    ///
    /// User options are looked up in `context`; a user the platform did not
    /// resolve is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands, unknown or missing
    /// options, and invalid values.
    pub fn from_invocation(
        invocation: &CommandInvocation,
        context: &CommandContext,
    ) -> Result<Self, CommandError> {
        let options = Options::new(invocation);
        match invocation.command() {
            "create-task" => create_task(&options, context),
            "get-task" => {
                options.only(&["task-id"])?;
                Ok(Self::GetTask {
                    task_id: options.task_id()?,
                })
            }
            "get-tasks-by-role" => options.role_listing(RoleListing::All),
            "unassigned-tasks-by-role" => options.role_listing(RoleListing::Unassigned),
            "completed-tasks-by-role" => options.role_listing(RoleListing::Completed),
            "assign-task" | "unassign-task" => {
                options.only(&["task-id", "user"])?;
                let task_id = options.task_id()?;
                let user = lookup_user(context, options.required("user")?)?;
                if invocation.command() == "assign-task" {
                    Ok(Self::AssignTask { task_id, user })
                } else {
                    Ok(Self::UnassignTask { task_id, user })
                }
            }
            "update-task-status" => {
                options.only(&["task-id", "status"])?;
                let task_id = options.task_id()?;
                let status = TaskStatus::try_from(options.required("status")?)
                    .map_err(|err| options.invalid("status", &err))?;
                Ok(Self::UpdateTaskStatus { task_id, status })
            }
            "list-task-assignees" => {
                options.only(&["task-id"])?;
                Ok(Self::ListTaskAssignees {
                    task_id: options.task_id()?,
                })
            }
            "assigned-tasks" => {
                options.only(&[])?;
                Ok(Self::AssignedTasks)
            }
            "subscribe" | "unsubscribe" => {
                options.only(&["repository", "channel"])?;
                let repository = RepositoryName::new(options.required("repository")?)
                    .map_err(|err| options.invalid("repository", &err))?;
                let channel = options.optional("channel").map_or_else(
                    || Ok(context.channel().clone()),
                    |raw| ChannelId::new(raw).map_err(|err| options.invalid("channel", &err)),
                )?;
                if invocation.command() == "subscribe" {
                    Ok(Self::Subscribe {
                        repository,
                        channel,
                    })
                } else {
                    Ok(Self::Unsubscribe {
                        repository,
                        channel,
                    })
                }
            }
            other => Err(CommandError::UnknownCommand(other.to_owned())),
        }
    }

    /// Tokenizes and validates raw command text in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for malformed text or invalid options.
    pub fn parse(raw_input: &str, context: &CommandContext) -> Result<Self, CommandError> {
        Self::from_invocation(&CommandInvocation::parse(raw_input)?, context)
    }
}

fn create_task(
    options: &Options<'_>,
    context: &CommandContext,
) -> Result<TaskCommand, CommandError> {
    options.only(&["title", "description", "assignee", "role"])?;
    let mut draft = TaskDraft::new(options.required("title")?)
        .map_err(|err| options.invalid("title", &err))?;
    if let Some(description) = options.optional("description") {
        draft = draft.with_description(description);
    }
    if let Some(role) = options.optional("role") {
        draft = draft
            .with_role(role)
            .map_err(|err| options.invalid("role", &err))?;
    }
    let assignee = options
        .optional("assignee")
        .map(|reference| lookup_user(context, reference))
        .transpose()?;
    Ok(TaskCommand::CreateTask(CreateTaskArgs { draft, assignee }))
}

fn lookup_user(context: &CommandContext, reference: &str) -> Result<ChatUser, CommandError> {
    context
        .user(reference)
        .cloned()
        .ok_or_else(|| CommandError::UnknownUser(reference.to_owned()))
}

struct Options<'a> {
    command: &'a str,
    values: &'a BTreeMap<String, String>,
}

impl<'a> Options<'a> {
    fn new(invocation: &'a CommandInvocation) -> Self {
        Self {
            command: invocation.command(),
            values: invocation.parameters(),
        }
    }

    fn only(&self, allowed: &[&str]) -> Result<(), CommandError> {
        self.values
            .keys()
            .find(|key| !allowed.contains(&key.as_str()))
            .map_or(Ok(()), |unknown| {
                Err(CommandError::UnknownParameter {
                    command: self.command.to_owned(),
                    parameter: unknown.clone(),
                })
            })
    }

    fn optional(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).map(String::as_str)
    }

    fn required(&self, name: &str) -> Result<&'a str, CommandError> {
        self.optional(name)
            .ok_or_else(|| CommandError::MissingParameter {
                command: self.command.to_owned(),
                parameter: name.to_owned(),
            })
    }

    fn invalid(&self, name: &str, reason: &impl fmt::Display) -> CommandError {
        CommandError::InvalidParameterValue {
            command: self.command.to_owned(),
            parameter: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    fn task_id(&self) -> Result<TaskId, CommandError> {
        let raw = self.required("task-id")?;
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|err| self.invalid("task-id", &err))?;
        TaskId::new(value).map_err(|err| self.invalid("task-id", &err))
    }

    fn role_listing(&self, listing: RoleListing) -> Result<TaskCommand, CommandError> {
        self.only(&["role"])?;
        let role =
            RoleTag::new(self.required("role")?).map_err(|err| self.invalid("role", &err))?;
        Ok(TaskCommand::TasksByRole { role, listing })
    }
}
