//! Data access API: the request/response boundary over the collection store.
//!
//! # Responsibility
//! - Serve `GET` (both collections) and `POST` (replace one collection).
//! - Map persistence failures and malformed requests to status + JSON body.
//!
//! # Invariants
//! - `GET` always returns both collections together.
//! - A rejected `POST` (unknown operation, non-array or mis-shaped `data`,
//!   unparseable body) never touches storage.
//! - There are no per-item verbs; per-item semantics live in the client.
//!
//! # See also
//! - `crate::client` for the typed facade that speaks this contract.

use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::store::{CollectionKind, CollectionStore, StoreResult};
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Path of the single data endpoint.
pub const DATA_ENDPOINT: &str = "/api/data";

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save data";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid operation or data";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// `GET` response body: both collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSnapshot {
    pub todos: Vec<Todo>,
    pub projects: Vec<Project>,
}

/// `POST` request body: `{"operation": ..., "data": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "data", rename_all = "snake_case")]
pub enum SaveRequest {
    SaveTodos(Vec<Todo>),
    SaveProjects(Vec<Project>),
}

impl SaveRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SaveTodos(_) => "save_todos",
            Self::SaveProjects(_) => "save_projects",
        }
    }

    pub fn collection(&self) -> CollectionKind {
        match self {
            Self::SaveTodos(_) => CollectionKind::Todos,
            Self::SaveProjects(_) => CollectionKind::Projects,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::SaveTodos(items) => items.len(),
            Self::SaveProjects(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `POST` success body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    pub success: bool,
}

/// Error body for 4xx/5xx replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Transport-neutral reply: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    /// Builds a failure reply with body `{"error": message}`.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the `error` message of a failure body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Request handler for the data endpoint over any `CollectionStore`.
pub struct DataApi<S: CollectionStore> {
    store: S,
    // Serializes each single save against the two-file read in `load_snapshot`.
    io_lock: Mutex<()>,
}

impl<S: CollectionStore> DataApi<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            io_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles `GET`: returns `{todos, projects}` or 500.
    pub fn get(&self) -> ApiReply {
        let started_at = Instant::now();
        match self.load_snapshot() {
            Ok(snapshot) => {
                info!(
                    "event=api_get module=api status=ok todos={} projects={} duration_ms={}",
                    snapshot.todos.len(),
                    snapshot.projects.len(),
                    started_at.elapsed().as_millis()
                );
                match serde_json::to_value(&snapshot) {
                    Ok(body) => ApiReply::ok(body),
                    Err(err) => {
                        error!(
                            "event=api_get module=api status=error error_code=encode_failed error={}",
                            err
                        );
                        ApiReply::error(STATUS_INTERNAL_ERROR, LOAD_FAILED_MESSAGE)
                    }
                }
            }
            Err(err) => {
                error!(
                    "event=api_get module=api status=error error_code=load_failed duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                ApiReply::error(STATUS_INTERNAL_ERROR, LOAD_FAILED_MESSAGE)
            }
        }
    }

    /// Handles `POST` with a raw JSON body.
    ///
    /// Unparseable bodies and bodies that do not decode as a `SaveRequest`
    /// are answered with 400 before any storage access.
    pub fn post(&self, body: &[u8]) -> ApiReply {
        match serde_json::from_slice::<SaveRequest>(body) {
            Ok(request) => self.save(request),
            Err(err) => {
                warn!(
                    "event=api_post module=api status=rejected error_code=invalid_request error={}",
                    err
                );
                ApiReply::error(STATUS_BAD_REQUEST, INVALID_REQUEST_MESSAGE)
            }
        }
    }

    /// Handles an already decoded `POST`.
    pub fn save(&self, request: SaveRequest) -> ApiReply {
        let started_at = Instant::now();
        let operation = request.operation();
        let count = request.len();

        let result = {
            let _guard = self.io_lock.lock();
            match &request {
                SaveRequest::SaveTodos(todos) => self.store.save_todos(todos),
                SaveRequest::SaveProjects(projects) => self.store.save_projects(projects),
            }
        };

        match result {
            Ok(()) => {
                info!(
                    "event=api_post module=api status=ok operation={} count={} duration_ms={}",
                    operation,
                    count,
                    started_at.elapsed().as_millis()
                );
                ApiReply::ok(json!({ "success": true }))
            }
            Err(err) => {
                error!(
                    "event=api_post module=api status=error error_code=save_failed operation={} duration_ms={} error={}",
                    operation,
                    started_at.elapsed().as_millis(),
                    err
                );
                ApiReply::error(STATUS_INTERNAL_ERROR, SAVE_FAILED_MESSAGE)
            }
        }
    }

    fn load_snapshot(&self) -> StoreResult<DataSnapshot> {
        let _guard = self.io_lock.lock();
        Ok(DataSnapshot {
            todos: self.store.load_todos()?,
            projects: self.store.load_projects()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SaveRequest;
    use serde_json::json;

    #[test]
    fn save_request_uses_operation_and_data_keys() {
        let value = serde_json::to_value(SaveRequest::SaveProjects(Vec::new())).unwrap();
        assert_eq!(value, json!({ "operation": "save_projects", "data": [] }));
    }

    #[test]
    fn save_request_rejects_unknown_operation_and_object_data() {
        let unknown = json!({ "operation": "drop_all", "data": [] });
        assert!(serde_json::from_value::<SaveRequest>(unknown).is_err());

        let object_data = json!({ "operation": "save_todos", "data": {} });
        assert!(serde_json::from_value::<SaveRequest>(object_data).is_err());
    }
}
