//! In-memory collection store with fault injection.

use super::{CollectionStore, StoreError, StoreResult};
use crate::model::project::Project;
use crate::model::todo::Todo;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Collections {
    todos: Vec<Todo>,
    projects: Vec<Project>,
    fail_loads: bool,
    fail_saves: bool,
}

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(todos: Vec<Todo>, projects: Vec<Project>) -> Self {
        Self {
            inner: Mutex::new(Collections {
                todos,
                projects,
                ..Collections::default()
            }),
        }
    }

    /// Makes every following load fail until switched off.
    pub fn fail_loads(&self, fail: bool) {
        self.inner.lock().fail_loads = fail;
    }

    /// Makes every following save fail until switched off.
    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().fail_saves = fail;
    }
}

impl CollectionStore for MemoryStore {
    fn load_todos(&self) -> StoreResult<Vec<Todo>> {
        let inner = self.inner.lock();
        if inner.fail_loads {
            return Err(StoreError::Unavailable("injected load failure".to_string()));
        }
        Ok(inner.todos.clone())
    }

    fn save_todos(&self, todos: &[Todo]) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_saves {
            return Err(StoreError::Unavailable("injected save failure".to_string()));
        }
        inner.todos = todos.to_vec();
        Ok(())
    }

    fn load_projects(&self) -> StoreResult<Vec<Project>> {
        let inner = self.inner.lock();
        if inner.fail_loads {
            return Err(StoreError::Unavailable("injected load failure".to_string()));
        }
        Ok(inner.projects.clone())
    }

    fn save_projects(&self, projects: &[Project]) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_saves {
            return Err(StoreError::Unavailable("injected save failure".to_string()));
        }
        inner.projects = projects.to_vec();
        Ok(())
    }
}
