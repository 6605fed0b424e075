//! Server bootstrap: open the store, bind, serve until shutdown.

use crate::config::ServerConfig;
use crate::routes::router;
use localtodo_core::{CollectionStore, DataApi, JsonFileStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub enum ServeError {
    /// The data directory could not be opened or seeded.
    Store(StoreError),
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    Io(std::io::Error),
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "failed to open data store: {err}"),
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Io(err) => write!(f, "server error: {err}"),
        }
    }
}

impl Error for ServeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Bind { source, .. } => Some(source),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Runs the server described by `config` until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<(), ServeError> {
    let store = JsonFileStore::open(&config.data_dir)?;
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.addr,
            source,
        })?;
    serve_on(listener, Arc::new(DataApi::new(store)), shutdown_signal()).await
}

/// Serves `api` on an already bound listener until `shutdown` resolves.
pub async fn serve_on<S, F>(
    listener: TcpListener,
    api: Arc<DataApi<S>>,
    shutdown: F,
) -> Result<(), ServeError>
where
    S: CollectionStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().map_err(ServeError::Io)?;
    info!(
        "event=server_start module=server status=ok addr={} version={}",
        local_addr,
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServeError::Io)?;

    info!("event=server_stop module=server status=ok addr={}", local_addr);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            "event=server_signal module=server status=error error={}",
            err
        );
        std::future::pending::<()>().await;
    }
}
