//! Persistence store for the todo and project collections.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract used by the data API.
//! - Keep file layout and serialization details behind `CollectionStore`.
//!
//! # Invariants
//! - A collection that was never written loads as an empty sequence.
//! - `save_*` replaces the full collection; there is no merge.
//! - A failed save leaves the previously stored collection intact.
//!
//! # See also
//! - `crate::api` for the request boundary built on top of this contract.

use crate::model::project::Project;
use crate::model::todo::Todo;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Which of the two persisted collections an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Todos,
    Projects,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todos => "todos",
            Self::Projects => "projects",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Todos => "todos.json",
            Self::Projects => "projects.json",
        }
    }
}

impl Display for CollectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence failure.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem read/write failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored document is not a valid collection.
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Backend refused the operation.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at `{}`: {source}", path.display()),
            Self::Corrupt { path, source } => {
                write!(f, "corrupt collection at `{}`: {source}", path.display())
            }
            Self::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

/// Whole-collection storage for todos and projects.
pub trait CollectionStore: Send + Sync {
    fn load_todos(&self) -> StoreResult<Vec<Todo>>;
    fn save_todos(&self, todos: &[Todo]) -> StoreResult<()>;
    fn load_projects(&self) -> StoreResult<Vec<Project>>;
    fn save_projects(&self, projects: &[Project]) -> StoreResult<()>;
}

impl<S: CollectionStore + ?Sized> CollectionStore for std::sync::Arc<S> {
    fn load_todos(&self) -> StoreResult<Vec<Todo>> {
        (**self).load_todos()
    }

    fn save_todos(&self, todos: &[Todo]) -> StoreResult<()> {
        (**self).save_todos(todos)
    }

    fn load_projects(&self) -> StoreResult<Vec<Project>> {
        (**self).load_projects()
    }

    fn save_projects(&self, projects: &[Project]) -> StoreResult<()> {
        (**self).save_projects(projects)
    }
}
