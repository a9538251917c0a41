//! Task status flag.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress flag of a task.
///
/// Every transition between the three values is permitted in either
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Work has not started. Initial state.
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    /// Work is under way.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work is finished.
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    /// All status values in display order.
    pub const ALL: [Self; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    /// Returns the canonical label used for rendering and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    /// Parses a status case-sensitively.
    ///
    /// Both the label form (`In Progress`) and the compact identifier form
    /// (`InProgress`) are accepted. No trimming or case folding is applied.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Not Started" | "NotStarted" => Ok(Self::NotStarted),
            "In Progress" | "InProgress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
