//! Derived, read-only views over the controller's collections.
//!
//! # Responsibility
//! - Hold presentation-local view state: selected project, filters and
//!   per-project collapse flags.
//! - Derive the displayed todo set, the "All Tasks" grouping and the
//!   empty-state classification from current collections.
//!
//! # Invariants
//! - Nothing here is persisted; every view is recomputed from the inputs.
//! - Changing the selected project resets both filters to off.
//! - Groups follow project list order; buckets with no visible todo are
//!   omitted. Todos whose project does not exist belong to no group.

use crate::model::ids::ProjectId;
use crate::model::project::Project;
use crate::model::todo::Todo;
use std::collections::HashSet;

/// Title shown when no project is selected.
pub const ALL_TASKS_TITLE: &str = "All Tasks";

/// Display filters. Both default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilters {
    /// Drop todos with `completed == true`.
    pub hide_completed: bool,
    /// Keep only todos with `under_ten_minutes == true`.
    pub show_only_under_ten: bool,
}

impl TodoFilters {
    pub fn matches(&self, todo: &Todo) -> bool {
        if self.hide_completed && todo.completed {
            return false;
        }
        if self.show_only_under_ten && !todo.under_ten_minutes {
            return false;
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.hide_completed || self.show_only_under_ten
    }
}

/// Selection, filters and collapse flags for one client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    selected_project: Option<ProjectId>,
    filters: TodoFilters,
    collapsed: HashSet<ProjectId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means the "All Tasks" view.
    pub fn selected_project(&self) -> Option<&ProjectId> {
        self.selected_project.as_ref()
    }

    /// Changes the selection; filters reset when the selection changes.
    pub fn select_project(&mut self, project: Option<ProjectId>) {
        if self.selected_project != project {
            self.filters = TodoFilters::default();
        }
        self.selected_project = project;
    }

    pub fn filters(&self) -> TodoFilters {
        self.filters
    }

    pub fn set_hide_completed(&mut self, hide_completed: bool) {
        self.filters.hide_completed = hide_completed;
    }

    pub fn set_show_only_under_ten(&mut self, show_only_under_ten: bool) {
        self.filters.show_only_under_ten = show_only_under_ten;
    }

    /// Flips the collapse flag of one "All Tasks" bucket; returns the new flag.
    pub fn toggle_collapsed(&mut self, project_id: &ProjectId) -> bool {
        if self.collapsed.remove(project_id) {
            false
        } else {
            self.collapsed.insert(project_id.clone());
            true
        }
    }

    pub fn is_collapsed(&self, project_id: &ProjectId) -> bool {
        self.collapsed.contains(project_id)
    }

    /// Drops view state that referenced a deleted project.
    pub(crate) fn forget_project(&mut self, project_id: &ProjectId) {
        self.collapsed.remove(project_id);
        if self.selected_project.as_ref() == Some(project_id) {
            self.select_project(None);
        }
    }
}

/// One "All Tasks" bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup<'a> {
    pub project: &'a Project,
    /// Visible todos of this project, in collection order.
    pub todos: Vec<&'a Todo>,
    pub collapsed: bool,
}

impl ProjectGroup<'_> {
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}

/// Why a view has nothing to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// No project exists.
    NoProjects,
    /// Projects exist but no todo belongs to any of them.
    NoTodos,
    /// The selected project has no todos at all.
    ProjectHasNoTodos,
    /// Todos exist but `hide_completed` hides every one of them.
    AllCompletedHidden,
    /// Todos exist but `show_only_under_ten` leaves none.
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoProjects => "Create a new project to get started",
            Self::NoTodos => "Create a new task to get started",
            Self::ProjectHasNoTodos => "No tasks in this project yet",
            Self::AllCompletedHidden => "All tasks are completed",
            Self::NoMatches => "No quick tasks match the current filters",
        }
    }
}

/// Todos in the current selection, before filters.
pub fn scoped_todos<'a>(todos: &'a [Todo], view: &ViewState) -> Vec<&'a Todo> {
    match view.selected_project() {
        Some(project_id) => todos.iter().filter(|todo| todo.belongs_to(project_id)).collect(),
        None => todos.iter().collect(),
    }
}

/// Todos in the current selection that pass the filters.
pub fn visible_todos<'a>(todos: &'a [Todo], view: &ViewState) -> Vec<&'a Todo> {
    let filters = view.filters();
    scoped_todos(todos, view)
        .into_iter()
        .filter(|todo| filters.matches(todo))
        .collect()
}

/// Filtered todos bucketed by project, in project list order.
pub fn group_by_project<'a>(
    todos: &'a [Todo],
    projects: &'a [Project],
    view: &ViewState,
) -> Vec<ProjectGroup<'a>> {
    let filters = view.filters();
    projects
        .iter()
        .map(|project| ProjectGroup {
            project,
            todos: todos
                .iter()
                .filter(|todo| todo.belongs_to(&project.id) && filters.matches(todo))
                .collect(),
            collapsed: view.is_collapsed(&project.id),
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Todos whose `project_id` matches no existing project.
pub fn orphaned_todos<'a>(todos: &'a [Todo], projects: &[Project]) -> Vec<&'a Todo> {
    let live: HashSet<&ProjectId> = projects.iter().map(|project| &project.id).collect();
    todos
        .iter()
        .filter(|todo| !live.contains(&todo.project_id))
        .collect()
}

/// Classifies why the current view is empty; `None` when something shows.
pub fn classify_empty(todos: &[Todo], projects: &[Project], view: &ViewState) -> Option<EmptyState> {
    let universe: Vec<&Todo> = match view.selected_project() {
        Some(project_id) => {
            let scoped: Vec<&Todo> = todos.iter().filter(|todo| todo.belongs_to(project_id)).collect();
            if scoped.is_empty() {
                return Some(EmptyState::ProjectHasNoTodos);
            }
            scoped
        }
        None => {
            if projects.is_empty() {
                return Some(EmptyState::NoProjects);
            }
            let live: HashSet<&ProjectId> = projects.iter().map(|project| &project.id).collect();
            let grouped: Vec<&Todo> = todos
                .iter()
                .filter(|todo| live.contains(&todo.project_id))
                .collect();
            if grouped.is_empty() {
                return Some(EmptyState::NoTodos);
            }
            grouped
        }
    };

    let filters = view.filters();
    if universe.iter().any(|todo| filters.matches(todo)) {
        return None;
    }

    let quick_enough = universe
        .iter()
        .any(|todo| !filters.show_only_under_ten || todo.under_ten_minutes);
    if quick_enough && filters.hide_completed {
        Some(EmptyState::AllCompletedHidden)
    } else {
        Some(EmptyState::NoMatches)
    }
}
