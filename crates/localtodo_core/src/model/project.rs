//! Project record: a named grouping of todos.

use super::ids::ProjectId;
use super::timestamp::CreatedAt;
use super::{is_blank, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: CreatedAt,
}

impl Project {
    /// Creates a project; `created_at` is truncated to millisecond precision.
    pub fn new(id: ProjectId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: CreatedAt::from_instant(created_at),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        if is_blank(&self.name) {
            return Err(ModelValidationError::BlankProjectName);
        }
        Ok(())
    }

    /// Returns a copy carrying `name`, keeping id and creation time.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
