//! Crate-wide error type and result alias.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can fail inside the framework.
///
/// Handlers and middleware return this type; the dispatcher maps any `Err`
/// to a single 500 response and keeps serving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template '{view}' could not be read: {source}")]
    Template {
        view: String,
        source: std::io::Error,
    },

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an application-defined error from a plain message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
