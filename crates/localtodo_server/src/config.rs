//! Server configuration.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - An unparseable address is an error, never a silent fallback.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

pub const ADDR_ENV: &str = "LOCALTODO_ADDR";
pub const DATA_DIR_ENV: &str = "LOCALTODO_DATA_DIR";

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Directory holding `todos.json` and `projects.json`.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads `LOCALTODO_ADDR` and `LOCALTODO_DATA_DIR`, defaulting when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = non_blank(lookup(ADDR_ENV)) {
            config.addr = parse_addr(&raw)?;
        }
        if let Some(raw) = non_blank(lookup(DATA_DIR_ENV)) {
            config.data_dir = PathBuf::from(raw);
        }
        Ok(config)
    }
}

/// Parses a `host:port` listen address.
pub fn parse_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddr {
            value: raw.to_string(),
            source,
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidAddr {
        value: String,
        source: AddrParseError,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddr { value, source } => {
                write!(f, "invalid listen address `{value}`: {source}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAddr { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, ADDR_ENV, DATA_DIR_ENV, DEFAULT_ADDR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = ServerConfig::from_lookup(lookup(&[(ADDR_ENV, "  ")])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ADDR_ENV, "0.0.0.0:8080"),
            (DATA_DIR_ENV, "/srv/todos"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.data_dir, PathBuf::from("/srv/todos"));
    }

    #[test]
    fn bad_address_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&[(ADDR_ENV, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
        assert!(err.to_string().contains("localhost"));
    }
}
