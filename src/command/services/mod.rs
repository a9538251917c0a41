//! Service layer for the command surface.

mod handler;

pub use handler::{CommandHandler, CommandHandlerError, CommandHandlerResult, CommandReply};
