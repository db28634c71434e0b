//! Analyze command - one batch pass over a time window.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::aggregation::{aggregate_records, AnalysisResult};
use crate::config::{expand_home, AnalyzerConfig, TimeWindow};
use crate::models::RequestRecord;
use crate::report::{render_json, render_text};
use crate::storage::{fetch_request_logs, open_database};


/// How a run that did not hit a fatal error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Reported,
    NoRecords,
}


/// Validate the window, load matching records, aggregate and print the report.
pub fn run(config: &AnalyzerConfig) -> Result<RunOutcome> {
    info!(start = %config.start, end = %config.end, "analyzing time range");

    let window = TimeWindow::parse(&config.start, &config.end)?;

    let db_path = expand_home(&config.db_path);
    let conn = open_database(&db_path)?;
    info!(path = %db_path.display(), "connected to database");

    let records = fetch_request_logs(&conn, &window, &config.filter)?;

    let Some(result) = analyze(&records, config.parallel) else {
        warn!("no matching records found");
        return Ok(RunOutcome::NoRecords);
    };

    let output = if config.json {
        render_json(&result, &window, &config.filter).context("Failed to serialize report")?
    } else {
        render_text(&result, &window, &config.filter)
    };
    println!("{output}");

    Ok(RunOutcome::Reported)
}


/// Aggregate a fetched batch; `None` when there is nothing to report.
pub fn analyze(records: &[RequestRecord], parallel: bool) -> Option<AnalysisResult> {
    if records.is_empty() {
        return None;
    }

    info!(count = records.len(), parallel, "aggregating records");
    let result = aggregate_records(records, parallel);

    if result.parse_errors > 0 {
        warn!(parse_errors = result.parse_errors, "some records had no readable rate-limit status");
    }

    Some(result)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::config::RecordFilter;
    use crate::error::AnalyzerError;

    fn config(db_path: PathBuf, start: &str, end: &str) -> AnalyzerConfig {
        AnalyzerConfig {
            db_path,
            start: start.to_string(),
            end: end.to_string(),
            filter: RecordFilter::default(),
            parallel: false,
            json: false,
        }
    }

    #[test]
    fn test_analyze_empty_batch() {
        assert!(analyze(&[], false).is_none());
    }

    #[test]
    fn test_analyze_batch() {
        let records = vec![RequestRecord {
            response_body: Some("data: {\"type\":\"message_delta\",\"usage\":{\"output_tokens\":7}}".to_string()),
            response_headers: Some(r#"{"Anthropic-Ratelimit-Unified-5h-Status":"allowed"}"#.to_string()),
            session_id: Some("sess-1".to_string()),
            ..Default::default()
        }];

        let result = analyze(&records, false).unwrap();
        assert_eq!(result.total_records, 1);
        assert_eq!(result.get("allowed").unwrap().tokens.output_tokens, 7);
    }

    #[test]
    fn test_bad_time_fails_before_database() {
        let tmp_dir = tempfile::TempDir::new().unwrap();
        let db_path = tmp_dir.path().join("missing.db");

        let err = run(&config(db_path, "2025-08-26", "2025-08-26 18:00:00")).unwrap_err();
        let err = err.downcast::<AnalyzerError>().unwrap();
        assert!(matches!(err, AnalyzerError::InvalidTime { .. }));
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let tmp_dir = tempfile::TempDir::new().unwrap();
        let db_path = tmp_dir.path().join("missing.db");

        let err = run(&config(db_path, "2025-08-26 14:00:00", "2025-08-26 18:00:00")).unwrap_err();
        let err = err.downcast::<AnalyzerError>().unwrap();
        assert!(matches!(err, AnalyzerError::Database { .. }));
    }
}
