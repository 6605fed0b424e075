//! HTTP surface for the local todo data endpoint.
//! Serves `/api/data` over a `JsonFileStore` and provides the matching
//! reqwest-based `DataTransport` for clients.

pub mod config;
pub mod http_transport;
pub mod routes;
pub mod serve;

pub use config::{ConfigError, ServerConfig};
pub use http_transport::HttpTransport;
pub use routes::router;
pub use serve::{serve, serve_on, ServeError};
