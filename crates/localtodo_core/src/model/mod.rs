//! Domain model for todos and the projects that group them.
//!
//! # Responsibility
//! - Define the canonical `Todo` / `Project` records and their wire shape.
//! - Provide injectable id and clock sources for newly created records.
//!
//! # Invariants
//! - Ids are opaque, non-blank strings and never change after creation.
//! - `created_at` is stamped once at creation with millisecond precision;
//!   stored values keep their original text.
//! - Display text (`Todo::text`, `Project::name`) is never blank in records
//!   produced by this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod clock;
pub mod ids;
pub mod project;
pub mod timestamp;
pub mod todo;

/// Validation failure for a todo or project record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Record id is empty or whitespace.
    BlankId,
    /// Todo title is empty or whitespace.
    BlankTodoText,
    /// Todo is not attached to any project id.
    BlankProjectRef,
    /// Project name is empty or whitespace.
    BlankProjectName,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "id must not be blank"),
            Self::BlankTodoText => write!(f, "Todo text cannot be empty"),
            Self::BlankProjectRef => write!(f, "todo projectId must not be blank"),
            Self::BlankProjectName => write!(f, "Project name cannot be empty"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
