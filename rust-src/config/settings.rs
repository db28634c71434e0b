//! Application settings, constants and time-window validation.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{AnalyzerError, Result};


/// Default location of the proxy's request log database.
pub const DEFAULT_DB_PATH: &str = "./logs/logs.db";

/// Wall-clock format used for window bounds and the `timestamp` column.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label for the fixed offset the window strings are interpreted in.
pub const DISPLAY_TIMEZONE: &str = "GMT+8";

/// Only requests whose endpoint contains this host are counted.
pub const DEFAULT_ENDPOINT_HOST: &str = "api.anthropic.com";

/// Requests for models containing this substring are excluded (case-sensitive).
pub const DEFAULT_EXCLUDED_MODEL: &str = "haiku";

/// Response header carrying the 5h unified rate-limit status.
pub const RATE_LIMIT_STATUS_HEADER: &str = "Anthropic-Ratelimit-Unified-5h-Status";

/// Points formula: one point per this many tokens (rounded).
pub const TOKENS_PER_POINT: u64 = 3072;

/// Points formula: flat points per request.
pub const POINTS_PER_REQUEST: u64 = 2;


/// Upstream filter applied by the record source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub endpoint_host: String,
    pub excluded_model: String,
}


impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            endpoint_host: DEFAULT_ENDPOINT_HOST.to_string(),
            excluded_model: DEFAULT_EXCLUDED_MODEL.to_string(),
        }
    }
}


/// Inclusive `[start, end]` window, kept as the validated input strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}


impl TimeWindow {
    /// Validate both bounds and their ordering.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_at = parse_time(start)?;
        let end_at = parse_time(end)?;

        if start_at > end_at {
            return Err(AnalyzerError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}


fn parse_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|source| AnalyzerError::InvalidTime {
        value: value.to_string(),
        source,
    })
}


/// Everything one analysis run needs, assembled from CLI flags.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub db_path: PathBuf,
    pub start: String,
    pub end: String,
    pub filter: RecordFilter,
    pub parallel: bool,
    pub json: bool,
}


/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}
