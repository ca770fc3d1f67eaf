//! Process configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `POSTS_API_ADDR` | `127.0.0.1:4000` | socket address to bind |
//! | `POSTS_API_DATABASE` | unset: in-memory store | SQLite file path (`:memory:` allowed) |
//! | `POSTS_API_STORE_TIMEOUT_MS` | unset: no timeout | deadline per store call, 1..=600000 |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::store::{MemoryStore, SqliteStore, Store, StoreError, Timed};

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 4000);
const MAX_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which backend holds the data.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreKind {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreKind,
    pub store_timeout: Option<Duration>,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let addr = match get("POSTS_API_ADDR") {
            Some(raw) => {
                raw.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    var: "POSTS_API_ADDR",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?
            }
            None => SocketAddr::from(DEFAULT_ADDR),
        };

        let store = match get("POSTS_API_DATABASE") {
            Some(path) => StoreKind::Sqlite(PathBuf::from(path)),
            None => StoreKind::Memory,
        };

        let store_timeout = get("POSTS_API_STORE_TIMEOUT_MS")
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self { addr, store, store_timeout })
    }

    /// Opens the configured backend, wrapped in [`Timed`] when a timeout is set.
    pub fn open_store(&self) -> Result<Arc<dyn Store>, StoreError> {
        let store: Arc<dyn Store> = match &self.store {
            StoreKind::Memory => {
                info!("using in-memory store");
                Arc::new(MemoryStore::new())
            }
            StoreKind::Sqlite(path) => Arc::new(SqliteStore::open(path)?),
        };

        Ok(match self.store_timeout {
            Some(limit) => {
                info!(limit_ms = limit.as_millis() as u64, "store calls are time-bounded");
                Arc::new(Timed::new(store, limit))
            }
            None => store,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "POSTS_API_STORE_TIMEOUT_MS",
        value: raw.to_owned(),
        reason,
    };

    let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if !(1..=MAX_TIMEOUT_MS).contains(&ms) {
        return Err(invalid(format!("must be between 1 and {MAX_TIMEOUT_MS}")));
    }
    Ok(Duration::from_millis(ms))
}
