//! Fatal error taxonomy for an analysis run.
//!
//! Per-record parse problems never show up here: the stream parser and the
//! header classifier degrade to zero counters and `unknown` instead.

use std::path::PathBuf;


#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("invalid time '{value}' (expected YYYY-MM-DD HH:MM:SS): {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("start time {start} is after end time {end}")]
    InvalidWindow { start: String, end: String },

    #[error("failed to open database {}: {source}", path.display())]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}


pub type Result<T> = std::result::Result<T, AnalyzerError>;
