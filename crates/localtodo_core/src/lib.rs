//! Core state-sync layer for the local todo app.
//! Owns the record model, the JSON collection store, the data endpoint
//! handler, the client facade and the optimistic controller.

pub mod api;
pub mod client;
pub mod controller;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use api::{ApiReply, DataApi, DataSnapshot, SaveRequest, DATA_ENDPOINT};
pub use client::{ClientError, ClientResult, DataClient, DataTransport, LocalTransport};
pub use controller::{
    AppState, ControllerError, ControllerResult, MutationKind, MutationOutcome, MutationState,
    Notice, NoticeLevel, PendingMutation, SettledMutation, TodoController,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::clock::{Clock, FixedClock, SystemClock};
pub use model::ids::{
    IdGenerator, ProjectId, SequentialIdGenerator, TodoId, UuidIdGenerator, DEFAULT_PROJECT_ID,
};
pub use model::project::Project;
pub use model::timestamp::CreatedAt;
pub use model::todo::Todo;
pub use model::ModelValidationError;
pub use store::{CollectionKind, CollectionStore, JsonFileStore, MemoryStore, StoreError, StoreResult};
pub use view::{EmptyState, ProjectGroup, TodoFilters, ViewState, ALL_TASKS_TITLE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
