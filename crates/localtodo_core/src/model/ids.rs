//! Record identifiers and id generation.
//!
//! # Responsibility
//! - Give todo and project ids distinct types over the same opaque string.
//! - Hide id minting behind `IdGenerator` so callers can inject determinism.
//!
//! # Invariants
//! - Generated ids are unique for the lifetime of one generator.
//! - Ids are serialized as bare JSON strings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Sentinel project id used when a todo is added and no project exists.
pub const DEFAULT_PROJECT_ID: &str = "default";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a todo.
    TodoId
);

string_id!(
    /// Stable identifier of a project.
    ProjectId
);

impl ProjectId {
    /// Returns the `"default"` sentinel project id.
    pub fn default_project() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

/// Source of fresh record ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random 128-bit ids rendered as 32 lowercase hex chars.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids, counting from 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, ProjectId, SequentialIdGenerator, TodoId, UuidIdGenerator};
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_yields_unique_hex_ids() {
        let generator = UuidIdGenerator;
        let ids: HashSet<String> = (0..256).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 256);
        assert!(ids
            .iter()
            .all(|id| id.len() == 32 && id.chars().all(|c| c.is_ascii_hexdigit())));
    }

    #[test]
    fn sequential_generator_counts_from_one() {
        let generator = SequentialIdGenerator::new("todo");
        assert_eq!(generator.next_id(), "todo-1");
        assert_eq!(generator.next_id(), "todo-2");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&TodoId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let decoded: ProjectId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(decoded.as_str(), "p1");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(TodoId::new("  ").is_blank());
        assert!(!ProjectId::default_project().is_blank());
    }
}
