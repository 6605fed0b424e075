//! HTTP routes for the data endpoint.
//!
//! # Responsibility
//! - Mount `GET`/`POST` on `/api/data` and translate `ApiReply` into HTTP.
//! - Run blocking store access on tokio's blocking pool.
//!
//! # Invariants
//! - The raw body reaches `DataApi::post` unparsed, so malformed JSON and a
//!   missing content type are answered by the API's own 400 reply.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use localtodo_core::api::{
    ApiReply, LOAD_FAILED_MESSAGE, SAVE_FAILED_MESSAGE, STATUS_INTERNAL_ERROR,
};
use localtodo_core::{CollectionStore, DataApi, DATA_ENDPOINT};
use log::error;
use std::sync::Arc;

/// Builds the application router over a shared `DataApi`.
pub fn router<S: CollectionStore + 'static>(api: Arc<DataApi<S>>) -> Router {
    Router::new()
        .route(DATA_ENDPOINT, get(get_data::<S>).post(post_data::<S>))
        .with_state(api)
}

async fn get_data<S: CollectionStore + 'static>(State(api): State<Arc<DataApi<S>>>) -> Response {
    let reply = tokio::task::spawn_blocking(move || api.get())
        .await
        .unwrap_or_else(|err| {
            error!(
                "event=http_get module=routes status=error error_code=task_failed error={}",
                err
            );
            ApiReply::error(STATUS_INTERNAL_ERROR, LOAD_FAILED_MESSAGE)
        });
    into_response(reply)
}

async fn post_data<S: CollectionStore + 'static>(
    State(api): State<Arc<DataApi<S>>>,
    body: Bytes,
) -> Response {
    let reply = tokio::task::spawn_blocking(move || api.post(&body))
        .await
        .unwrap_or_else(|err| {
            error!(
                "event=http_post module=routes status=error error_code=task_failed error={}",
                err
            );
            ApiReply::error(STATUS_INTERNAL_ERROR, SAVE_FAILED_MESSAGE)
        });
    into_response(reply)
}

fn into_response(reply: ApiReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}
