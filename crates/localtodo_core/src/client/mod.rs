//! Client data facade over the data access API.
//!
//! # Responsibility
//! - Abstract the request transport (`DataTransport`) from the typed
//!   fetch/add/update helpers (`DataClient`).
//! - Turn non-OK replies and transport failures into `ClientError`.
//!
//! # Invariants
//! - Every facade call either returns normally or returns `Err`; callers own
//!   user-facing error reporting.
//! - Single-item operations are fetch-all -> mutate -> save-all with no
//!   compare-and-swap (last write wins).

use crate::api::{ApiReply, DataSnapshot, SaveRequest};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod facade;
mod local;

pub use facade::DataClient;
pub use local::LocalTransport;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a facade call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Server answered with a non-OK status.
    Status { status: u16, message: String },
    /// Request could not be delivered or the reply could not be read.
    Transport(String),
    /// Reply body did not match the expected shape.
    Decode(String),
}

impl ClientError {
    /// Builds a `Status` error from a failed reply, keeping its `error` text.
    pub fn from_reply(reply: &ApiReply) -> Self {
        Self::Status {
            status: reply.status,
            message: reply.error_message().unwrap_or_default().to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, message } if message.is_empty() => {
                write!(f, "API error: {status}")
            }
            Self::Status { status, message } => write!(f, "API error: {status} ({message})"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Decode(message) => write!(f, "decode error: {message}"),
        }
    }
}

impl Error for ClientError {}

/// Moves data-endpoint requests to the server and back.
#[async_trait]
pub trait DataTransport: Send + Sync {
    /// `GET` the data endpoint.
    async fn get_data(&self) -> ClientResult<DataSnapshot>;

    /// `POST` one collection replacement.
    async fn post_data(&self, request: &SaveRequest) -> ClientResult<()>;
}

#[async_trait]
impl<T: DataTransport + ?Sized> DataTransport for Arc<T> {
    async fn get_data(&self) -> ClientResult<DataSnapshot> {
        (**self).get_data().await
    }

    async fn post_data(&self, request: &SaveRequest) -> ClientResult<()> {
        (**self).post_data(request).await
    }
}
