use localtodo_core::{
    ClientError, CollectionStore, DataApi, DataClient, JsonFileStore, MemoryStore,
    MutationOutcome, TodoController,
};
use localtodo_server::{serve_on, HttpTransport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_server<S: CollectionStore + 'static>(api: Arc<DataApi<S>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_on(listener, api, std::future::pending()));
    addr
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn controller_scenario_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(Arc::new(DataApi::new(
        JsonFileStore::open(dir.path()).unwrap(),
    )))
    .await;
    let client = DataClient::new(HttpTransport::new(&format!("http://{addr}")));
    let mut controller = TodoController::new(client);
    controller.load().await.unwrap();

    controller.add_project("Work").await.unwrap();
    controller.add_todo("Buy milk", None, true).await.unwrap();
    let todo_id = controller.todos()[0].id.clone();
    controller.toggle_todo(&todo_id).await.unwrap();

    let reopened = JsonFileStore::open(dir.path()).unwrap();
    let stored = reopened.load_todos().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].completed);
    assert!(stored[0].under_ten_minutes);
    assert_eq!(stored[0].project_id, controller.projects()[0].id);

    let work = controller.projects()[0].id.clone();
    controller.delete_project(&work).await.unwrap();
    assert!(reopened.load_todos().unwrap().is_empty());
    assert!(reopened.load_projects().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_errors_become_status_errors_and_roll_back() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(Arc::new(DataApi::new(Arc::clone(&store)))).await;
    let mut controller = TodoController::new(DataClient::new(HttpTransport::new(&format!(
        "http://{addr}"
    ))));
    controller.load().await.unwrap();

    store.fail_saves(true);
    let outcome = controller.add_project("Unsaved").await.unwrap();

    match outcome {
        MutationOutcome::RolledBack {
            error, resynced, ..
        } => {
            assert_eq!(
                error,
                ClientError::Status {
                    status: 500,
                    message: "Failed to save data".to_string()
                }
            );
            assert!(resynced);
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    assert!(controller.projects().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DataClient::new(HttpTransport::new(&format!("http://{addr}")));
    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
