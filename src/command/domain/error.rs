//! Error types for command parsing and argument validation.

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised while turning raw command text into a typed command.
///
/// Every variant is a caller mistake and is reported before any store
/// mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Input was empty.
    #[error("command input cannot be empty")]
    EmptyInput,

    /// Input does not start with `/`.
    #[error("commands must start with '/'")]
    MissingLeadingSlash,

    /// Command name contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid command name '{0}'")]
    InvalidCommandName(String),

    /// A parameter token does not match `key=value`.
    #[error("invalid parameter token '{token}': expected key=value")]
    InvalidParameterToken {
        /// The malformed token text.
        token: String,
    },

    /// A quoted string was not terminated.
    #[error("unterminated quoted value in command")]
    UnterminatedQuotedValue,

    /// The same key was given twice.
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Command is not one of the supported commands.
    #[error("unknown command '/{0}'")]
    UnknownCommand(String),

    /// Parameter is not accepted by the command.
    #[error("unknown parameter '{parameter}' for command '/{command}'")]
    UnknownParameter {
        /// Command name.
        command: String,
        /// Unknown parameter name.
        parameter: String,
    },

    /// Required parameter missing.
    #[error("missing required parameter '{parameter}' for command '/{command}'")]
    MissingParameter {
        /// Command name.
        command: String,
        /// Missing parameter name.
        parameter: String,
    },

    /// Parameter value failed validation.
    #[error("invalid value for parameter '{parameter}' in command '/{command}': {reason}")]
    InvalidParameterValue {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
        /// Validation reason.
        reason: String,
    },

    /// A user option names someone the platform did not resolve.
    #[error("unknown user '{0}'")]
    UnknownUser(String),
}

impl CommandError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
