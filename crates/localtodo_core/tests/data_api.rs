use chrono::{TimeZone, Utc};
use localtodo_core::api::{
    INVALID_REQUEST_MESSAGE, LOAD_FAILED_MESSAGE, SAVE_FAILED_MESSAGE, STATUS_BAD_REQUEST,
    STATUS_INTERNAL_ERROR, STATUS_OK,
};
use localtodo_core::{
    CollectionKind, CollectionStore, DataApi, JsonFileStore, MemoryStore, Project, ProjectId,
    SaveRequest, Todo, TodoId,
};
use serde_json::json;
use std::fs;

fn sample_todo() -> Todo {
    Todo::new(
        TodoId::new("t1"),
        "Buy milk",
        ProjectId::new("p1"),
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    )
}

fn sample_project() -> Project {
    Project::new(
        ProjectId::new("p1"),
        "Work",
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
    )
}

#[test]
fn get_on_fresh_store_returns_two_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let api = DataApi::new(JsonFileStore::open(dir.path()).unwrap());

    let reply = api.get();
    assert_eq!(reply.status, STATUS_OK);
    assert_eq!(reply.body, json!({ "todos": [], "projects": [] }));
}

#[test]
fn post_save_todos_persists_and_acknowledges() {
    let dir = tempfile::tempdir().unwrap();
    let api = DataApi::new(JsonFileStore::open(dir.path()).unwrap());
    let body = serde_json::to_vec(&SaveRequest::SaveTodos(vec![sample_todo()])).unwrap();

    let reply = api.post(&body);
    assert_eq!(reply.status, STATUS_OK);
    assert_eq!(reply.body, json!({ "success": true }));

    let fetched = api.get();
    assert_eq!(fetched.body["todos"][0]["id"], "t1");
    assert_eq!(fetched.body["todos"][0]["createdAt"], "2024-06-01T09:00:00.000Z");
    assert_eq!(fetched.body["projects"], json!([]));
}

#[test]
fn post_then_get_returns_created_at_text_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let api = DataApi::new(JsonFileStore::open(dir.path()).unwrap());
    let todos = json!([
        {
            "id": "t1", "text": "Precise", "completed": false, "notes": "",
            "projectId": "p1", "createdAt": "2024-05-01T12:00:00.123456Z",
            "underTenMinutes": false
        },
        {
            "id": "t2", "text": "Offset", "completed": true, "notes": "",
            "projectId": "p1", "createdAt": "2024-05-01T14:00:00+02:00",
            "underTenMinutes": false
        }
    ]);
    let projects = json!([
        { "id": "p1", "name": "Work", "createdAt": "2024-05-01T14:00:00+02:00" }
    ]);

    let body = json!({ "operation": "save_todos", "data": todos }).to_string();
    assert_eq!(api.post(body.as_bytes()).status, STATUS_OK);
    let body = json!({ "operation": "save_projects", "data": projects }).to_string();
    assert_eq!(api.post(body.as_bytes()).status, STATUS_OK);

    let fetched = api.get();
    assert_eq!(fetched.body["todos"], todos);
    assert_eq!(fetched.body["projects"], projects);
}

#[test]
fn post_save_projects_with_empty_array_clears_projects() {
    let api = DataApi::new(MemoryStore::with_collections(
        vec![sample_todo()],
        vec![sample_project()],
    ));

    let reply = api.post(br#"{"operation":"save_projects","data":[]}"#);
    assert_eq!(reply.status, STATUS_OK);
    assert!(api.store().load_projects().unwrap().is_empty());
    assert_eq!(api.store().load_todos().unwrap().len(), 1);
}

#[test]
fn unknown_operation_is_rejected_without_touching_storage() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    store.save_todos(&[sample_todo()]).unwrap();
    let todos_path = store.path_for(CollectionKind::Todos);
    let projects_path = store.path_for(CollectionKind::Projects);
    let todos_before = fs::read(&todos_path).unwrap();
    let projects_before = fs::read(&projects_path).unwrap();
    let api = DataApi::new(store);

    let reply = api.post(br#"{"operation":"drop_all","data":[]}"#);
    assert_eq!(reply.status, STATUS_BAD_REQUEST);
    assert_eq!(reply.error_message(), Some(INVALID_REQUEST_MESSAGE));

    assert_eq!(fs::read(&todos_path).unwrap(), todos_before);
    assert_eq!(fs::read(&projects_path).unwrap(), projects_before);
}

#[test]
fn non_array_data_and_garbage_bodies_are_bad_requests() {
    let api = DataApi::new(MemoryStore::with_collections(vec![sample_todo()], Vec::new()));

    for body in [
        &br#"{"operation":"save_todos","data":{"id":"t1"}}"#[..],
        &br#"{"operation":"save_todos"}"#[..],
        &br#"{"data":[]}"#[..],
        &br#"{"operation":"save_todos","data":[{"id":"t2"}]}"#[..],
        &b"not json at all"[..],
    ] {
        let reply = api.post(body);
        assert_eq!(reply.status, STATUS_BAD_REQUEST, "body: {:?}", String::from_utf8_lossy(body));
        assert_eq!(reply.error_message(), Some(INVALID_REQUEST_MESSAGE));
    }

    assert_eq!(api.store().load_todos().unwrap(), vec![sample_todo()]);
}

#[test]
fn load_failure_maps_to_500_with_error_body() {
    let store = MemoryStore::new();
    store.fail_loads(true);
    let api = DataApi::new(store);

    let reply = api.get();
    assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
    assert_eq!(reply.body, json!({ "error": LOAD_FAILED_MESSAGE }));
    assert!(!reply.is_success());
}

#[test]
fn save_failure_maps_to_500_with_error_body() {
    let store = MemoryStore::new();
    store.fail_saves(true);
    let api = DataApi::new(store);

    let reply = api.save(SaveRequest::SaveProjects(vec![sample_project()]));
    assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
    assert_eq!(reply.error_message(), Some(SAVE_FAILED_MESSAGE));
}

#[test]
fn corrupt_document_makes_get_fail() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    fs::write(store.path_for(CollectionKind::Projects), "[{").unwrap();
    let api = DataApi::new(store);

    assert_eq!(api.get().status, STATUS_INTERNAL_ERROR);
}
