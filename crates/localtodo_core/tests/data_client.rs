use chrono::{TimeZone, Utc};
use localtodo_core::{
    ClientError, CollectionStore, DataClient, FixedClock, JsonFileStore, LocalTransport,
    MemoryStore, ProjectId, SequentialIdGenerator, TodoId,
};
use std::sync::Arc;

fn client_over(store: Arc<MemoryStore>) -> DataClient<LocalTransport<Arc<MemoryStore>>> {
    DataClient::with_sources(
        LocalTransport::from_store(store),
        Arc::new(SequentialIdGenerator::new("id")),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(),
        )),
    )
}

#[tokio::test]
async fn add_todo_appends_with_fresh_id_and_timestamp() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));

    let first = client
        .add_todo("Buy milk", ProjectId::new("p1"), false)
        .await
        .unwrap();
    let second = client
        .add_todo("Call mom", ProjectId::new("p1"), true)
        .await
        .unwrap();

    assert_eq!(first.id.as_str(), "id-1");
    assert_eq!(second.id.as_str(), "id-2");
    assert!(second.under_ten_minutes);
    assert_eq!(
        first.created_at.instant(),
        Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
    );
    assert_eq!(first.created_at.as_str(), "2024-02-29T12:00:00.000Z");

    let stored = client.fetch_todos().await.unwrap();
    assert_eq!(stored, vec![first, second]);
}

#[tokio::test]
async fn update_todo_replaces_matching_record_only() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let kept = client
        .add_todo("Keep me", ProjectId::new("p1"), false)
        .await
        .unwrap();
    let mut edited = client
        .add_todo("Edit me", ProjectId::new("p1"), false)
        .await
        .unwrap();
    edited.notes = "new notes".to_string();

    assert!(client.update_todo(&edited).await.unwrap());

    let stored = store.load_todos().unwrap();
    assert_eq!(stored, vec![kept, edited]);
}

#[tokio::test]
async fn update_of_unknown_todo_reports_false_and_does_not_save() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let ghost = client.new_todo("Ghost", ProjectId::new("p1"), false);

    store.fail_saves(true);
    assert!(!client.update_todo(&ghost).await.unwrap());
}

#[tokio::test]
async fn toggle_todo_flips_completion_in_storage() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let todo = client
        .add_todo("Water plants", ProjectId::new("p1"), false)
        .await
        .unwrap();

    let toggled = client.toggle_todo(&todo.id).await.unwrap().unwrap();
    assert!(toggled.completed);
    assert!(store.load_todos().unwrap()[0].completed);

    let back = client.toggle_todo(&todo.id).await.unwrap().unwrap();
    assert!(!back.completed);
    assert_eq!(client.toggle_todo(&TodoId::new("missing")).await.unwrap(), None);
}

#[tokio::test]
async fn delete_project_cascades_to_its_todos() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let work = client.add_project("Work").await.unwrap();
    let home = client.add_project("Home").await.unwrap();
    client.add_todo("Report", work.id.clone(), false).await.unwrap();
    let chores = client.add_todo("Dishes", home.id.clone(), true).await.unwrap();
    client.add_todo("Standup", work.id.clone(), true).await.unwrap();

    client.delete_project(&work.id).await.unwrap();

    let snapshot = client.fetch_all().await.unwrap();
    assert_eq!(snapshot.projects, vec![home]);
    assert_eq!(snapshot.todos, vec![chores]);
}

#[tokio::test]
async fn failed_project_delete_reports_status_and_leaves_storage_alone() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let work = client.add_project("Work").await.unwrap();
    let report = client.add_todo("Report", work.id.clone(), false).await.unwrap();

    store.fail_saves(true);
    let err = client.delete_project(&work.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));

    store.fail_saves(false);
    let snapshot = client.fetch_all().await.unwrap();
    assert_eq!(snapshot.projects, vec![work]);
    assert_eq!(snapshot.todos, vec![report]);
}

#[tokio::test]
async fn delete_todo_filters_by_id() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let gone = client.add_todo("Gone", ProjectId::new("p1"), false).await.unwrap();
    let stays = client.add_todo("Stays", ProjectId::new("p1"), false).await.unwrap();

    client.delete_todo(&gone.id).await.unwrap();
    assert_eq!(client.fetch_todos().await.unwrap(), vec![stays]);
}

#[tokio::test]
async fn rename_via_update_project_keeps_identity() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));
    let project = client.add_project("Wrok").await.unwrap();

    let renamed = project.renamed("Work");
    assert!(client.update_project(&renamed).await.unwrap());

    let stored = client.fetch_projects().await.unwrap();
    assert_eq!(stored[0].id, project.id);
    assert_eq!(stored[0].name, "Work");
    assert_eq!(stored[0].created_at, project.created_at);
}

#[tokio::test]
async fn server_failures_surface_as_status_errors() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));

    store.fail_loads(true);
    let err = client.fetch_all().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "API error: 500 (Failed to load data)");

    store.fail_loads(false);
    store.fail_saves(true);
    let err = client
        .add_project("Never saved")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}

#[tokio::test]
async fn client_writes_reach_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    let client = DataClient::new(LocalTransport::from_store(
        JsonFileStore::open(dir.path()).unwrap(),
    ));

    let project = client.add_project("Errands").await.unwrap();
    client.add_todo("Post office", project.id.clone(), true).await.unwrap();

    let reopened = JsonFileStore::open(dir.path()).unwrap();
    let todos = reopened.load_todos().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].project_id, project.id);
    assert_eq!(todos[0].id.as_str().len(), 32);
}
