//! Optimistic mutation lifecycle: `Pending -> Committed | RolledBack`.
//!
//! # Responsibility
//! - Carry the persistence plan computed when a mutation was applied locally.
//! - Run that plan against the facade without borrowing the controller, so
//!   several pending mutations can be persisted concurrently.
//!
//! # Invariants
//! - A `PendingMutation` is consumed exactly once by `persist`.
//! - A `SettledMutation` keeps the pre-mutation copy of every collection the
//!   mutation touched, for restoration when resynchronization fails.

use crate::client::{ClientError, ClientResult, DataClient, DataTransport};
use crate::model::project::Project;
use crate::model::todo::Todo;
use std::fmt::{Display, Formatter};

/// Which controller operation produced a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    AddTodo,
    UpdateTodo,
    ToggleTodo,
    DeleteTodo,
    AddProject,
    RenameProject,
    DeleteProject,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddTodo => "add_todo",
            Self::UpdateTodo => "update_todo",
            Self::ToggleTodo => "toggle_todo",
            Self::DeleteTodo => "delete_todo",
            Self::AddProject => "add_project",
            Self::RenameProject => "rename_project",
            Self::DeleteProject => "delete_project",
        }
    }

    /// Add/update flows replace local state with a fresh fetch on success;
    /// delete/toggle flows keep the optimistic value.
    pub fn refetches_on_success(self) -> bool {
        matches!(
            self,
            Self::AddTodo | Self::UpdateTodo | Self::AddProject | Self::RenameProject
        )
    }

    pub fn touches_todos(self) -> bool {
        !matches!(self, Self::AddProject | Self::RenameProject)
    }

    pub fn touches_projects(self) -> bool {
        matches!(
            self,
            Self::AddProject | Self::RenameProject | Self::DeleteProject
        )
    }

    pub fn success_message(self) -> Option<&'static str> {
        match self {
            Self::AddTodo => Some("Todo added successfully"),
            Self::UpdateTodo => Some("Todo updated successfully"),
            Self::ToggleTodo => None,
            Self::DeleteTodo => Some("Todo deleted successfully"),
            Self::AddProject => Some("Project added successfully"),
            Self::RenameProject => Some("Project renamed successfully"),
            Self::DeleteProject => Some("Project deleted successfully"),
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AddTodo => "Failed to add todo. Please try again.",
            Self::UpdateTodo | Self::ToggleTodo => "Failed to update todo. Please try again.",
            Self::DeleteTodo => "Failed to delete todo. Please try again.",
            Self::AddProject => "Failed to add project. Please try again.",
            Self::RenameProject => "Failed to rename project. Please try again.",
            Self::DeleteProject => "Failed to delete project. Please try again.",
        }
    }
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

/// Pre-mutation copies of the collections a mutation touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) todos: Option<Vec<Todo>>,
    pub(crate) projects: Option<Vec<Project>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PersistPlan {
    AppendTodo(Todo),
    ReplaceTodo(Todo),
    SaveTodos(Vec<Todo>),
    AppendProject(Project),
    ReplaceProject(Project),
    Cascade {
        projects: Vec<Project>,
        todos: Vec<Todo>,
    },
}

/// A mutation already applied to local state, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending mutation must be persisted and reconciled"]
pub struct PendingMutation {
    kind: MutationKind,
    plan: PersistPlan,
    snapshot: Snapshot,
}

impl PendingMutation {
    pub(crate) fn new(kind: MutationKind, plan: PersistPlan, snapshot: Snapshot) -> Self {
        Self {
            kind,
            plan,
            snapshot,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn state(&self) -> MutationState {
        MutationState::Pending
    }

    /// Issues the persistence call(s) for this mutation.
    pub async fn persist<T: DataTransport>(self, client: &DataClient<T>) -> SettledMutation {
        let result = run_plan(self.plan, client).await;
        SettledMutation {
            kind: self.kind,
            snapshot: self.snapshot,
            result,
        }
    }
}

async fn run_plan<T: DataTransport>(plan: PersistPlan, client: &DataClient<T>) -> ClientResult<()> {
    match plan {
        PersistPlan::AppendTodo(todo) => client.append_todo(todo).await,
        PersistPlan::ReplaceTodo(todo) => client.update_todo(&todo).await.map(|_| ()),
        PersistPlan::SaveTodos(todos) => client.save_todos(todos).await,
        PersistPlan::AppendProject(project) => client.append_project(project).await,
        PersistPlan::ReplaceProject(project) => client.update_project(&project).await.map(|_| ()),
        PersistPlan::Cascade { projects, todos } => {
            tokio::try_join!(client.save_projects(projects), client.save_todos(todos))
                .map(|_| ())
        }
    }
}

/// A mutation whose persistence call has resolved or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledMutation {
    kind: MutationKind,
    snapshot: Snapshot,
    result: ClientResult<()>,
}

impl SettledMutation {
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub(crate) fn into_parts(self) -> (MutationKind, Snapshot, ClientResult<()>) {
        (self.kind, self.snapshot, self.result)
    }
}

/// Final state of a mutation after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted. `reconciled` is true when local state was replaced by a
    /// fresh fetch afterwards.
    Committed { kind: MutationKind, reconciled: bool },
    /// Persistence failed. `resynced` is true when local state was replaced
    /// by a fresh fetch, false when the pre-mutation copy was restored.
    RolledBack {
        kind: MutationKind,
        error: ClientError,
        resynced: bool,
    },
}

impl MutationOutcome {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Committed { kind, .. } | Self::RolledBack { kind, .. } => *kind,
        }
    }

    pub fn state(&self) -> MutationState {
        match self {
            Self::Committed { .. } => MutationState::Committed,
            Self::RolledBack { .. } => MutationState::RolledBack,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Committed { .. } => None,
            Self::RolledBack { error, .. } => Some(error),
        }
    }
}
