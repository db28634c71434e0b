//! Machine-readable usage report.

use serde::Serialize;

use crate::aggregation::AnalysisResult;
use crate::config::{RecordFilter, TimeWindow, DISPLAY_TIMEZONE};
use crate::models::TokenUsage;


#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    start: &'a str,
    end: &'a str,
    timezone: &'a str,
    endpoint_host: &'a str,
    excluded_model: &'a str,
    statuses: Vec<StatusReport<'a>>,
    total_records: u64,
    parse_errors: u64,
}


#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    status: &'a str,
    request_count: u64,
    unique_sessions: usize,
    #[serde(flatten)]
    tokens: TokenUsage,
    total_tokens: u64,
    points: u64,
}


/// Render the analysis as pretty-printed JSON, statuses in display order.
pub fn render_json(
    result: &AnalysisResult,
    window: &TimeWindow,
    filter: &RecordFilter,
) -> serde_json::Result<String> {
    let statuses = result
        .ordered()
        .into_iter()
        .map(|(status, stats)| StatusReport {
            status: status.as_str(),
            request_count: stats.request_count,
            unique_sessions: stats.unique_session_count(),
            tokens: stats.tokens,
            total_tokens: stats.tokens.total_tokens(),
            points: stats.points(),
        })
        .collect();

    let report = JsonReport {
        start: &window.start,
        end: &window.end,
        timezone: DISPLAY_TIMEZONE,
        endpoint_host: &filter.endpoint_host,
        excluded_model: &filter.excluded_model,
        statuses,
        total_records: result.total_records,
        parse_errors: result.parse_errors,
    };

    serde_json::to_string_pretty(&report)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateLimitStatus;
    use serde_json::Value;

    #[test]
    fn test_render_json() {
        let mut result = AnalysisResult::default();
        let usage = TokenUsage { input_tokens: 3000, output_tokens: 72, ..Default::default() };
        result.record(usage, RateLimitStatus::new("rejected"), Some("s1"));
        result.record(usage, RateLimitStatus::new("allowed"), Some("s1"));
        result.record(usage, RateLimitStatus::new("allowed"), Some("s2"));

        let window = TimeWindow::parse("2025-08-26 14:00:00", "2025-08-26 18:00:00").unwrap();
        let json = render_json(&result, &window, &RecordFilter::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_records"], 3);
        assert_eq!(value["parse_errors"], 0);
        assert_eq!(value["start"], "2025-08-26 14:00:00");

        let statuses = value["statuses"].as_array().unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0]["status"], "allowed");
        assert_eq!(statuses[0]["request_count"], 2);
        assert_eq!(statuses[0]["unique_sessions"], 2);
        assert_eq!(statuses[0]["input_tokens"], 6000);
        assert_eq!(statuses[0]["total_tokens"], 6144);
        assert_eq!(statuses[0]["points"], 6);
        assert_eq!(statuses[1]["status"], "rejected");
        assert_eq!(statuses[1]["points"], 3);
    }
}
