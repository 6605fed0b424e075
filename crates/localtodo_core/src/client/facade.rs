//! Typed facade: fetch/save whole collections and per-item read-modify-write.
//!
//! # Invariants
//! - New records get a fresh id from the injected `IdGenerator` and a
//!   `created_at` stamp from the injected `Clock`.
//! - Per-item operations are not atomic: two calls interleaved between one
//!   call's fetch and save lose the earlier write. This is the accepted
//!   single-writer limitation of the whole-collection API.

use super::{ClientResult, DataTransport};
use crate::api::{DataSnapshot, SaveRequest};
use crate::model::clock::{Clock, SystemClock};
use crate::model::ids::{IdGenerator, ProjectId, TodoId, UuidIdGenerator};
use crate::model::project::Project;
use crate::model::todo::Todo;
use log::debug;
use std::sync::Arc;

pub struct DataClient<T: DataTransport> {
    transport: Arc<T>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl<T: DataTransport> Clone for DataClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            ids: Arc::clone(&self.ids),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T: DataTransport> DataClient<T> {
    /// Creates a client with random ids and the wall clock.
    pub fn new(transport: T) -> Self {
        Self::with_sources(transport, Arc::new(UuidIdGenerator), Arc::new(SystemClock))
    }

    /// Creates a client with caller-provided id and time sources.
    pub fn with_sources(transport: T, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport: Arc::new(transport),
            ids,
            clock,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mints an unsaved todo with a fresh id and `created_at = now`.
    pub fn new_todo(
        &self,
        text: impl Into<String>,
        project_id: ProjectId,
        under_ten_minutes: bool,
    ) -> Todo {
        Todo::new(
            TodoId::new(self.ids.next_id()),
            text,
            project_id,
            self.clock.now(),
        )
        .with_under_ten_minutes(under_ten_minutes)
    }

    /// Mints an unsaved project with a fresh id and `created_at = now`.
    pub fn new_project(&self, name: impl Into<String>) -> Project {
        Project::new(ProjectId::new(self.ids.next_id()), name, self.clock.now())
    }

    /// Fetches both collections with a single request.
    pub async fn fetch_all(&self) -> ClientResult<DataSnapshot> {
        self.transport.get_data().await
    }

    pub async fn fetch_todos(&self) -> ClientResult<Vec<Todo>> {
        Ok(self.fetch_all().await?.todos)
    }

    pub async fn fetch_projects(&self) -> ClientResult<Vec<Project>> {
        Ok(self.fetch_all().await?.projects)
    }

    /// Replaces the stored todo collection.
    pub async fn save_todos(&self, todos: Vec<Todo>) -> ClientResult<()> {
        self.post(SaveRequest::SaveTodos(todos)).await
    }

    /// Replaces the stored project collection.
    pub async fn save_projects(&self, projects: Vec<Project>) -> ClientResult<()> {
        self.post(SaveRequest::SaveProjects(projects)).await
    }

    /// Creates and appends a todo; returns the stored record.
    pub async fn add_todo(
        &self,
        text: impl Into<String>,
        project_id: ProjectId,
        under_ten_minutes: bool,
    ) -> ClientResult<Todo> {
        let todo = self.new_todo(text, project_id, under_ten_minutes);
        self.append_todo(todo.clone()).await?;
        Ok(todo)
    }

    /// Appends a prebuilt todo (fetch, push, save).
    pub async fn append_todo(&self, todo: Todo) -> ClientResult<()> {
        let mut todos = self.fetch_todos().await?;
        todos.push(todo);
        self.save_todos(todos).await
    }

    /// Replaces the stored todo with the same id.
    ///
    /// Returns `false` without saving when no todo has that id.
    pub async fn update_todo(&self, todo: &Todo) -> ClientResult<bool> {
        let mut todos = self.fetch_todos().await?;
        match todos.iter_mut().find(|stored| stored.id == todo.id) {
            Some(stored) => {
                *stored = todo.clone();
                self.save_todos(todos).await?;
                Ok(true)
            }
            None => {
                debug!(
                    "event=client_update_todo module=client status=skipped reason=not_found id={}",
                    todo.id
                );
                Ok(false)
            }
        }
    }

    /// Flips `completed` on the stored todo; returns it, or `None` if absent.
    pub async fn toggle_todo(&self, id: &TodoId) -> ClientResult<Option<Todo>> {
        let mut todos = self.fetch_todos().await?;
        let Some(stored) = todos.iter_mut().find(|stored| &stored.id == id) else {
            return Ok(None);
        };
        stored.completed = !stored.completed;
        let toggled = stored.clone();
        self.save_todos(todos).await?;
        Ok(Some(toggled))
    }

    /// Removes a todo by id (fetch, filter, save).
    pub async fn delete_todo(&self, id: &TodoId) -> ClientResult<()> {
        let mut todos = self.fetch_todos().await?;
        todos.retain(|todo| &todo.id != id);
        self.save_todos(todos).await
    }

    /// Creates and appends a project; returns the stored record.
    pub async fn add_project(&self, name: impl Into<String>) -> ClientResult<Project> {
        let project = self.new_project(name);
        self.append_project(project.clone()).await?;
        Ok(project)
    }

    /// Appends a prebuilt project (fetch, push, save).
    pub async fn append_project(&self, project: Project) -> ClientResult<()> {
        let mut projects = self.fetch_projects().await?;
        projects.push(project);
        self.save_projects(projects).await
    }

    /// Replaces the stored project with the same id; `false` when absent.
    pub async fn update_project(&self, project: &Project) -> ClientResult<bool> {
        let mut projects = self.fetch_projects().await?;
        match projects.iter_mut().find(|stored| stored.id == project.id) {
            Some(stored) => {
                *stored = project.clone();
                self.save_projects(projects).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a project and every todo that references it.
    ///
    /// Both collections are saved concurrently as two independent writes.
    /// When one fails the other may still have landed, leaving the project
    /// gone with its todos kept or the reverse; callers resync via
    /// `fetch_all` after an error.
    pub async fn delete_project(&self, id: &ProjectId) -> ClientResult<()> {
        let DataSnapshot {
            mut todos,
            mut projects,
        } = self.fetch_all().await?;
        projects.retain(|project| &project.id != id);
        todos.retain(|todo| !todo.belongs_to(id));
        tokio::try_join!(self.save_projects(projects), self.save_todos(todos)).map(|_| ())
    }

    async fn post(&self, request: SaveRequest) -> ClientResult<()> {
        let result = self.transport.post_data(&request).await;
        if let Err(err) = &result {
            debug!(
                "event=client_post module=client status=error operation={} error={}",
                request.operation(),
                err
            );
        }
        result
    }
}
