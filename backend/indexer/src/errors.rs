//! Failures the indexer can hit while polling, storing or serving events.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Transport-level failure talking to the RPC node.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The RPC answered with a body that is not a JSON-RPC envelope.
    #[error("Malformed RPC response: {0}")]
    Json(#[from] serde_json::Error),

    /// The RPC rejected the request in a way retrying cannot fix.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("getEvents returned neither a result nor an error")]
    EmptyResult,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
