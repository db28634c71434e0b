//! Aggregation layer for usage statistics.

mod status_stats;

pub use status_stats::{aggregate_records, AnalysisResult, StatusStats};
