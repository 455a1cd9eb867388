//! Wire formats spoken with the time-series store.
//!
//! Two encodings coexist and are deliberately kept apart:
//! - [`series_line`]: the columnar JSON line import format, with millisecond
//!   timestamps, used to push data;
//! - [`instant_sample`]: the `[seconds, "value"]` pair found in instant
//!   query results.

pub mod instant_sample;
pub mod series_line;

pub use instant_sample::InstantSample;
pub use series_line::{decode_series, encode_series, write_series_lines};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Series {metric}: {values} values but {timestamps} timestamps")]
    LengthMismatch {
        metric: String,
        values: usize,
        timestamps: usize,
    },

    #[error("Series {metric}: timestamp {timestamp_ms}ms is out of range")]
    TimestampOutOfRange { metric: String, timestamp_ms: i64 },

    #[error("Invalid instant sample: {0}")]
    InvalidInstantSample(String),
}
