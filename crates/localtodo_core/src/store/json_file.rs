//! Directory-backed JSON collection store.
//!
//! # Responsibility
//! - Persist each collection as one pretty-printed JSON array document.
//! - Seed missing documents with `[]` so first access never fails.
//!
//! # Invariants
//! - Writes go to a temp file in the same directory and are renamed over the
//!   target, so readers see either the old or the new document.
//! - A missing document reads as an empty collection.

use super::{CollectionKind, CollectionStore, StoreError, StoreResult};
use crate::model::project::Project;
use crate::model::todo::Todo;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const EMPTY_COLLECTION: &[u8] = b"[]";

/// Store that keeps `todos.json` and `projects.json` in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates when needed) a data directory.
    ///
    /// # Side effects
    /// - Creates `dir` recursively.
    /// - Writes `[]` into each collection document that does not exist yet.
    /// - Emits `store_open` logging events.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        let dir = dir.as_ref().to_path_buf();
        info!("event=store_open module=store status=start");

        let store = Self { dir };
        match store.seed_missing() {
            Ok(()) => {
                info!(
                    "event=store_open module=store status=ok duration_ms={} dir={}",
                    started_at.elapsed().as_millis(),
                    store.dir.display()
                );
                Ok(store)
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error duration_ms={} error_code=store_seed_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document backing `kind`.
    pub fn path_for(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn seed_missing(&self) -> StoreResult<()> {
        self.ensure_dir()?;
        for kind in [CollectionKind::Todos, CollectionKind::Projects] {
            if !self.path_for(kind).exists() {
                self.write_document(kind, EMPTY_COLLECTION)?;
            }
        }
        Ok(())
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn load<T: DeserializeOwned>(&self, kind: CollectionKind) -> StoreResult<Vec<T>> {
        let started_at = Instant::now();
        match self.read_collection(kind) {
            Ok(items) => {
                info!(
                    "event=store_load module=store status=ok collection={} count={} duration_ms={}",
                    kind,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(items)
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error collection={} duration_ms={} error={}",
                    kind,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save<T: Serialize>(&self, kind: CollectionKind, items: &[T]) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.write_collection(kind, items) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok collection={} count={} duration_ms={}",
                    kind,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error collection={} duration_ms={} error={}",
                    kind,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn read_collection<T: DeserializeOwned>(&self, kind: CollectionKind) -> StoreResult<Vec<T>> {
        let path = self.path_for(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt { path, source })
    }

    fn write_collection<T: Serialize>(&self, kind: CollectionKind, items: &[T]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Corrupt {
            path: self.path_for(kind),
            source,
        })?;
        self.ensure_dir()?;
        self.write_document(kind, &bytes)
    }

    fn write_document(&self, kind: CollectionKind, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(kind);
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        staged.write_all(bytes).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged
            .persist(&path)
            .map_err(|err| io_err(err.error))?;
        Ok(())
    }
}

impl CollectionStore for JsonFileStore {
    fn load_todos(&self) -> StoreResult<Vec<Todo>> {
        self.load(CollectionKind::Todos)
    }

    fn save_todos(&self, todos: &[Todo]) -> StoreResult<()> {
        self.save(CollectionKind::Todos, todos)
    }

    fn load_projects(&self) -> StoreResult<Vec<Project>> {
        self.load(CollectionKind::Projects)
    }

    fn save_projects(&self, projects: &[Project]) -> StoreResult<()> {
        self.save(CollectionKind::Projects, projects)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileStore;
    use crate::store::{CollectionKind, CollectionStore, StoreError};
    use std::fs;

    #[test]
    fn open_seeds_both_documents_with_empty_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data")).unwrap();

        for kind in [CollectionKind::Todos, CollectionKind::Projects] {
            let raw = fs::read_to_string(store.path_for(kind)).unwrap();
            assert_eq!(raw, "[]");
        }
    }

    #[test]
    fn open_keeps_existing_documents() {
        let dir = tempfile::tempdir().unwrap();
        let todos_path = dir.path().join("todos.json");
        fs::write(&todos_path, "[\n  \n]").unwrap();

        JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(todos_path).unwrap(), "[\n  \n]");
    }

    #[test]
    fn deleted_document_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::remove_file(store.path_for(CollectionKind::Projects)).unwrap();

        assert!(store.load_projects().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::write(store.path_for(CollectionKind::Todos), "{not json").unwrap();

        let err = store.load_todos().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
