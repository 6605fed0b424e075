//! Application state controller.
//!
//! # Responsibility
//! - Own the client copy of todos/projects (`AppState`) and the view state.
//! - Apply every user mutation optimistically, persist it through the
//!   facade, then commit or roll back based on the result.
//! - Expose derived views (visible todos, groups, empty state) for renderers.
//!
//! # Invariants
//! - Validation happens before any local change or I/O.
//! - After a failed persistence call local state is replaced by a fresh fetch,
//!   or by the pre-mutation copy when that fetch fails too.
//! - Deleting a project removes its todos locally and in storage, and clears
//!   the selection when that project was selected.
//! - Every failure produces an error notice; the resynchronizing fetch after
//!   a failure never produces a second one.

use crate::api::DataSnapshot;
use crate::client::{ClientError, DataClient, DataTransport};
use crate::model::ids::{ProjectId, TodoId};
use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::model::ModelValidationError;
use crate::view::{self, EmptyState, ProjectGroup, ViewState, ALL_TASKS_TITLE};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod mutation;
mod notice;

pub use mutation::{MutationKind, MutationOutcome, MutationState, PendingMutation, SettledMutation};
pub use notice::{Notice, NoticeLevel};

use mutation::{PersistPlan, Snapshot};

const LOAD_FAILED_NOTICE: &str = "Failed to load data. Please try again.";

/// Client-side copy of both collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub todos: Vec<Todo>,
    pub projects: Vec<Project>,
}

impl From<DataSnapshot> for AppState {
    fn from(snapshot: DataSnapshot) -> Self {
        Self {
            todos: snapshot.todos,
            projects: snapshot.projects,
        }
    }
}

/// Rejection of a controller operation before any I/O, or a load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    Validation(ModelValidationError),
    TodoNotFound(TodoId),
    ProjectNotFound(ProjectId),
    Client(ClientError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Client(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Client(err) => Some(err),
            Self::TodoNotFound(_) | Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<ModelValidationError> for ControllerError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ClientError> for ControllerError {
    fn from(value: ClientError) -> Self {
        Self::Client(value)
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Optimistic state controller over a `DataClient`.
pub struct TodoController<T: DataTransport> {
    client: DataClient<T>,
    state: AppState,
    view: ViewState,
    notices: Vec<Notice>,
    loaded: bool,
}

impl<T: DataTransport> TodoController<T> {
    /// Creates an empty, not yet loaded controller.
    pub fn new(client: DataClient<T>) -> Self {
        Self {
            loaded: false,
            ..Self::with_state(client, AppState::default())
        }
    }

    /// Creates a controller that starts from an already known state.
    pub fn with_state(client: DataClient<T>, state: AppState) -> Self {
        Self {
            client,
            state,
            view: ViewState::new(),
            notices: Vec::new(),
            loaded: true,
        }
    }

    pub fn client(&self) -> &DataClient<T> {
        &self.client
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn todos(&self) -> &[Todo] {
        &self.state.todos
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Takes all pending notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetches both collections and replaces local state.
    ///
    /// # Errors
    /// Returns the facade error and queues a load-failure notice.
    pub async fn load(&mut self) -> ControllerResult<()> {
        match self.client.fetch_all().await {
            Ok(snapshot) => {
                info!(
                    "event=controller_load module=controller status=ok todos={} projects={}",
                    snapshot.todos.len(),
                    snapshot.projects.len()
                );
                self.state = snapshot.into();
                self.loaded = true;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=controller_load module=controller status=error error={}",
                    err
                );
                self.notices.push(Notice::error(LOAD_FAILED_NOTICE));
                self.loaded = true;
                Err(err.into())
            }
        }
    }

    /// Picks the project a new todo goes to: explicit, selected, first, or
    /// the `"default"` sentinel.
    pub fn target_project(&self, explicit: Option<ProjectId>) -> ProjectId {
        explicit
            .or_else(|| self.view.selected_project().cloned())
            .or_else(|| self.state.projects.first().map(|project| project.id.clone()))
            .unwrap_or_else(ProjectId::default_project)
    }

    pub fn begin_add_todo(
        &mut self,
        text: &str,
        project_id: Option<ProjectId>,
        under_ten_minutes: bool,
    ) -> ControllerResult<PendingMutation> {
        let target = self.target_project(project_id);
        let todo = self
            .client
            .new_todo(text.trim(), target, under_ten_minutes);
        self.validated(todo.validate())?;

        let snapshot = self.snapshot(MutationKind::AddTodo);
        self.state.todos.push(todo.clone());
        Ok(PendingMutation::new(
            MutationKind::AddTodo,
            PersistPlan::AppendTodo(todo),
            snapshot,
        ))
    }

    /// Applies `text`, `notes` and `under_ten_minutes` of `edit` to the
    /// todo with the same id.
    pub fn begin_update_todo(&mut self, edit: &Todo) -> ControllerResult<PendingMutation> {
        let index = self.todo_index(&edit.id)?;
        let mut updated = self.state.todos[index].clone();
        updated.apply_edit(edit);
        updated.text = updated.text.trim().to_string();
        self.validated(updated.validate())?;

        let snapshot = self.snapshot(MutationKind::UpdateTodo);
        self.state.todos[index] = updated.clone();
        Ok(PendingMutation::new(
            MutationKind::UpdateTodo,
            PersistPlan::ReplaceTodo(updated),
            snapshot,
        ))
    }

    pub fn begin_toggle_todo(&mut self, id: &TodoId) -> ControllerResult<PendingMutation> {
        let index = self.todo_index(id)?;
        let snapshot = self.snapshot(MutationKind::ToggleTodo);
        let toggled = self.state.todos[index].toggled();
        self.state.todos[index] = toggled.clone();
        Ok(PendingMutation::new(
            MutationKind::ToggleTodo,
            PersistPlan::ReplaceTodo(toggled),
            snapshot,
        ))
    }

    pub fn begin_delete_todo(&mut self, id: &TodoId) -> ControllerResult<PendingMutation> {
        self.todo_index(id)?;
        let snapshot = self.snapshot(MutationKind::DeleteTodo);
        self.state.todos.retain(|todo| &todo.id != id);
        Ok(PendingMutation::new(
            MutationKind::DeleteTodo,
            PersistPlan::SaveTodos(self.state.todos.clone()),
            snapshot,
        ))
    }

    pub fn begin_add_project(&mut self, name: &str) -> ControllerResult<PendingMutation> {
        let project = self.client.new_project(name.trim());
        self.validated(project.validate())?;

        let snapshot = self.snapshot(MutationKind::AddProject);
        self.state.projects.push(project.clone());
        Ok(PendingMutation::new(
            MutationKind::AddProject,
            PersistPlan::AppendProject(project),
            snapshot,
        ))
    }

    pub fn begin_rename_project(
        &mut self,
        id: &ProjectId,
        name: &str,
    ) -> ControllerResult<PendingMutation> {
        let index = self.project_index(id)?;
        let renamed = self.state.projects[index].renamed(name.trim());
        self.validated(renamed.validate())?;

        let snapshot = self.snapshot(MutationKind::RenameProject);
        self.state.projects[index] = renamed.clone();
        Ok(PendingMutation::new(
            MutationKind::RenameProject,
            PersistPlan::ReplaceProject(renamed),
            snapshot,
        ))
    }

    /// Removes the project and all of its todos; both collections are saved.
    pub fn begin_delete_project(&mut self, id: &ProjectId) -> ControllerResult<PendingMutation> {
        self.project_index(id)?;
        let snapshot = self.snapshot(MutationKind::DeleteProject);
        self.state.projects.retain(|project| &project.id != id);
        self.state.todos.retain(|todo| !todo.belongs_to(id));
        self.view.forget_project(id);
        Ok(PendingMutation::new(
            MutationKind::DeleteProject,
            PersistPlan::Cascade {
                projects: self.state.projects.clone(),
                todos: self.state.todos.clone(),
            },
            snapshot,
        ))
    }

    /// Persists and reconciles one pending mutation.
    pub async fn commit(&mut self, pending: PendingMutation) -> MutationOutcome {
        let settled = pending.persist(&self.client).await;
        self.reconcile(settled).await
    }

    /// Moves a settled mutation to `Committed` or `RolledBack`.
    pub async fn reconcile(&mut self, settled: SettledMutation) -> MutationOutcome {
        let (kind, snapshot, result) = settled.into_parts();
        match result {
            Ok(()) => {
                if let Some(message) = kind.success_message() {
                    self.notices.push(Notice::success(message));
                }
                let reconciled = kind.refetches_on_success() && self.refresh_touched(kind).await;
                info!(
                    "event=mutation_settle module=controller status=committed kind={} reconciled={}",
                    kind, reconciled
                );
                MutationOutcome::Committed { kind, reconciled }
            }
            Err(error) => {
                self.notices.push(Notice::error(kind.failure_message()));
                let resynced = match self.client.fetch_all().await {
                    Ok(fresh) => {
                        self.state = fresh.into();
                        true
                    }
                    Err(refetch_error) => {
                        warn!(
                            "event=mutation_resync module=controller status=error kind={} error={}",
                            kind, refetch_error
                        );
                        self.restore(snapshot);
                        false
                    }
                };
                warn!(
                    "event=mutation_settle module=controller status=rolled_back kind={} resynced={} error={}",
                    kind, resynced, error
                );
                MutationOutcome::RolledBack {
                    kind,
                    error,
                    resynced,
                }
            }
        }
    }

    pub async fn add_todo(
        &mut self,
        text: &str,
        project_id: Option<ProjectId>,
        under_ten_minutes: bool,
    ) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_add_todo(text, project_id, under_ten_minutes)?;
        Ok(self.commit(pending).await)
    }

    pub async fn update_todo(&mut self, edit: &Todo) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_update_todo(edit)?;
        Ok(self.commit(pending).await)
    }

    pub async fn toggle_todo(&mut self, id: &TodoId) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_toggle_todo(id)?;
        Ok(self.commit(pending).await)
    }

    pub async fn delete_todo(&mut self, id: &TodoId) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_delete_todo(id)?;
        Ok(self.commit(pending).await)
    }

    pub async fn add_project(&mut self, name: &str) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_add_project(name)?;
        Ok(self.commit(pending).await)
    }

    pub async fn rename_project(
        &mut self,
        id: &ProjectId,
        name: &str,
    ) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_rename_project(id, name)?;
        Ok(self.commit(pending).await)
    }

    pub async fn delete_project(&mut self, id: &ProjectId) -> ControllerResult<MutationOutcome> {
        let pending = self.begin_delete_project(id)?;
        Ok(self.commit(pending).await)
    }

    pub fn select_project(&mut self, project_id: Option<ProjectId>) {
        self.view.select_project(project_id);
    }

    pub fn set_hide_completed(&mut self, hide_completed: bool) {
        self.view.set_hide_completed(hide_completed);
    }

    pub fn set_show_only_under_ten(&mut self, show_only_under_ten: bool) {
        self.view.set_show_only_under_ten(show_only_under_ten);
    }

    pub fn toggle_collapsed(&mut self, project_id: &ProjectId) -> bool {
        self.view.toggle_collapsed(project_id)
    }

    /// Header title: selected project name, or "All Tasks".
    pub fn title(&self) -> &str {
        match self.view.selected_project() {
            Some(id) => self
                .state
                .projects
                .iter()
                .find(|project| &project.id == id)
                .map_or("", |project| project.name.as_str()),
            None => ALL_TASKS_TITLE,
        }
    }

    pub fn visible_todos(&self) -> Vec<&Todo> {
        view::visible_todos(&self.state.todos, &self.view)
    }

    /// "All Tasks" buckets; empty while a project is selected.
    pub fn groups(&self) -> Vec<ProjectGroup<'_>> {
        if self.view.selected_project().is_some() {
            return Vec::new();
        }
        view::group_by_project(&self.state.todos, &self.state.projects, &self.view)
    }

    pub fn orphaned_todos(&self) -> Vec<&Todo> {
        view::orphaned_todos(&self.state.todos, &self.state.projects)
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        view::classify_empty(&self.state.todos, &self.state.projects, &self.view)
    }

    fn validated(&mut self, result: Result<(), ModelValidationError>) -> ControllerResult<()> {
        result.map_err(|err| {
            self.notices.push(Notice::error(err.to_string()));
            ControllerError::Validation(err)
        })
    }

    fn todo_index(&mut self, id: &TodoId) -> ControllerResult<usize> {
        match self.state.todos.iter().position(|todo| &todo.id == id) {
            Some(index) => Ok(index),
            None => {
                self.notices.push(Notice::error("Todo not found"));
                Err(ControllerError::TodoNotFound(id.clone()))
            }
        }
    }

    fn project_index(&mut self, id: &ProjectId) -> ControllerResult<usize> {
        match self.state.projects.iter().position(|project| &project.id == id) {
            Some(index) => Ok(index),
            None => {
                self.notices.push(Notice::error("Project not found"));
                Err(ControllerError::ProjectNotFound(id.clone()))
            }
        }
    }

    fn snapshot(&self, kind: MutationKind) -> Snapshot {
        Snapshot {
            todos: kind.touches_todos().then(|| self.state.todos.clone()),
            projects: kind.touches_projects().then(|| self.state.projects.clone()),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        if let Some(todos) = snapshot.todos {
            self.state.todos = todos;
        }
        if let Some(projects) = snapshot.projects {
            self.state.projects = projects;
        }
    }

    /// Replaces the collections `kind` touched with a fresh fetch. Best effort.
    async fn refresh_touched(&mut self, kind: MutationKind) -> bool {
        match self.client.fetch_all().await {
            Ok(fresh) => {
                if kind.touches_todos() {
                    self.state.todos = fresh.todos;
                }
                if kind.touches_projects() {
                    self.state.projects = fresh.projects;
                }
                true
            }
            Err(err) => {
                warn!(
                    "event=mutation_refetch module=controller status=error kind={} error={}",
                    kind, err
                );
                false
            }
        }
    }
}
