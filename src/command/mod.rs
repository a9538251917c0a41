//! Chat command surface.
//!
//! Raw `/command key=value` text is tokenized once, validated into a typed
//! [`domain::TaskCommand`], and executed by [`services::CommandHandler`],
//! which always answers with text. Validation failures render as
//! `Error: ...` and missing tasks or users as `Not found: ...`.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
