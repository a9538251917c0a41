//! Domain types for the chat command surface.

mod command;
mod context;
mod error;
mod invocation;

pub use command::{COMMAND_NAMES, CreateTaskArgs, RoleListing, TaskCommand};
pub use context::{ChatUser, CommandContext};
pub use error::CommandError;
pub use invocation::CommandInvocation;
