//! Todo record.
//!
//! # Responsibility
//! - Define the todo wire shape shared by storage, API and client.
//! - Provide the field-level edits the controller performs.
//!
//! # Invariants
//! - `id`, `project_id` and `created_at` are never changed by edits.
//! - `under_ten_minutes` reads as `false` when absent on the wire.

use super::ids::{ProjectId, TodoId};
use super::timestamp::CreatedAt;
use super::{is_blank, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    /// Display title.
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Free-text notes, empty by default.
    #[serde(default)]
    pub notes: String,
    pub project_id: ProjectId,
    pub created_at: CreatedAt,
    /// Quick item flag (under ten minutes).
    #[serde(default)]
    pub under_ten_minutes: bool,
}

impl Todo {
    /// Creates an open todo with empty notes.
    ///
    /// `created_at` is truncated to millisecond precision.
    pub fn new(
        id: TodoId,
        text: impl Into<String>,
        project_id: ProjectId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            notes: String::new(),
            project_id,
            created_at: CreatedAt::from_instant(created_at),
            under_ten_minutes: false,
        }
    }

    pub fn with_under_ten_minutes(mut self, under_ten_minutes: bool) -> Self {
        self.under_ten_minutes = under_ten_minutes;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `BlankId` when `id` is blank.
    /// - `BlankTodoText` when `text` is blank.
    /// - `BlankProjectRef` when `project_id` is blank.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        if is_blank(&self.text) {
            return Err(ModelValidationError::BlankTodoText);
        }
        if self.project_id.is_blank() {
            return Err(ModelValidationError::BlankProjectRef);
        }
        Ok(())
    }

    /// Returns a copy with `completed` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copies the user-editable fields (`text`, `notes`, `under_ten_minutes`)
    /// from `edit`, keeping identity, project, completion and creation time.
    pub fn apply_edit(&mut self, edit: &Todo) {
        self.text = edit.text.clone();
        self.notes = edit.notes.clone();
        self.under_ten_minutes = edit.under_ten_minutes;
    }

    pub fn belongs_to(&self, project_id: &ProjectId) -> bool {
        &self.project_id == project_id
    }
}
