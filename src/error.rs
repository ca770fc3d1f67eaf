//! Unified error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// The error type returned by process-level operations.
///
/// Application-level errors (400, 500, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup and infrastructure failures: reading configuration, opening the
/// store, binding a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}
