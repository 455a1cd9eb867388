use crate::codec::CodecError;
use thiserror::Error;

/// Errors raised while talking to the time-series store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Transport failure, never retried.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Request to {endpoint} failed ({status}): {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid query response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Only scalar and vector results can be interpreted.
    #[error("Unsupported query result type {result_type:?}: {result}")]
    UnsupportedResultType { result_type: String, result: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
