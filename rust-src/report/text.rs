//! Plain-text usage report.

use crate::aggregation::{AnalysisResult, StatusStats};
use crate::config::{RecordFilter, TimeWindow, DISPLAY_TIMEZONE};
use crate::models::RateLimitStatus;


/// Render the analysis as the human-readable report.
pub fn render_text(result: &AnalysisResult, window: &TimeWindow, filter: &RecordFilter) -> String {
    let mut lines = vec![
        "=".repeat(50),
        "Token Usage Statistics Report".to_string(),
        "=".repeat(50),
        format!("Time Range: {} - {} ({})", window.start, window.end, DISPLAY_TIMEZONE),
        format!(
            "Filter: {}, Status=200, excluding models matching '{}'",
            filter.endpoint_host, filter.excluded_model
        ),
        String::new(),
        "Summary by Rate Limit Status:".to_string(),
        "-".repeat(30),
    ];

    for (status, stats) in result.ordered() {
        lines.push(String::new());
        render_status(&mut lines, status, stats);
    }

    lines.push(String::new());
    lines.push(format!("Total Processed Records: {}", format_number(result.total_records)));
    if result.parse_errors > 0 {
        lines.push(format!("Parse Errors: {}", format_number(result.parse_errors)));
    }

    lines.join("\n")
}


fn render_status(lines: &mut Vec<String>, status: &RateLimitStatus, stats: &StatusStats) {
    lines.push(format!("{}:", status.as_str().to_uppercase()));
    lines.push(format!("  Request Count: {}", format_number(stats.request_count)));
    lines.push(format!(
        "  Unique Sessions: {}",
        format_number(stats.unique_session_count() as u64)
    ));

    if stats.request_count == 0 {
        return;
    }

    let tokens = &stats.tokens;
    let totals = [
        ("Input", tokens.input_tokens),
        ("Cache Creation", tokens.cache_creation_input_tokens),
        ("Cache Read", tokens.cache_read_input_tokens),
        ("Output", tokens.output_tokens),
    ];

    // zero totals are omitted
    for (label, total) in totals.into_iter().filter(|(_, total)| *total > 0) {
        lines.push(format!("  Total {} Tokens: {}", label, format_number(total)));
    }
    lines.push(format!("  GAC Points: {}", format_number(stats.points())));
}


/// Format a number with commas.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenUsage;

    fn window() -> TimeWindow {
        TimeWindow::parse("2025-08-26 14:00:00", "2025-08-26 18:00:00").unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_render_sections_in_display_order() {
        let mut result = AnalysisResult::default();
        let usage = TokenUsage {
            input_tokens: 1200,
            cache_read_input_tokens: 29_520,
            output_tokens: 0,
            ..Default::default()
        };
        result.record(usage, RateLimitStatus::new("throttled"), Some("s2"));
        result.record(usage, RateLimitStatus::new("allowed"), Some("s1"));
        result.record(TokenUsage::default(), RateLimitStatus::unknown(), None);

        let text = render_text(&result, &window(), &RecordFilter::default());

        assert!(text.contains("Time Range: 2025-08-26 14:00:00 - 2025-08-26 18:00:00 (GMT+8)"));
        assert!(text.contains("Filter: api.anthropic.com, Status=200"));

        let allowed = text.find("ALLOWED:").unwrap();
        let unknown = text.find("UNKNOWN:").unwrap();
        let throttled = text.find("THROTTLED:").unwrap();
        assert!(allowed < unknown && unknown < throttled);

        assert!(text.contains("  Total Input Tokens: 1,200"));
        assert!(text.contains("  Total Cache Read Tokens: 29,520"));
        assert!(!text.contains("Cache Creation"));
        assert!(!text.contains("Output Tokens"));
        // 30720 tokens -> 10 points, plus 2 for the request
        assert!(text.contains("  GAC Points: 12"));
        assert!(text.contains("Total Processed Records: 3"));
        assert!(text.contains("Parse Errors: 1"));
    }

    #[test]
    fn test_render_omits_parse_errors_when_zero() {
        let mut result = AnalysisResult::default();
        result.record(TokenUsage::default(), RateLimitStatus::new("allowed"), None);

        let text = render_text(&result, &window(), &RecordFilter::default());
        assert!(!text.contains("Parse Errors"));
        assert!(!text.contains("ALLOWED_WARNING:"));
    }

    #[test]
    fn test_render_skips_zero_token_totals() {
        let mut result = AnalysisResult::default();
        result.record(TokenUsage::default(), RateLimitStatus::new("allowed"), Some("s1"));
        result.record(
            TokenUsage { output_tokens: 7, ..Default::default() },
            RateLimitStatus::new("rejected"),
            None,
        );

        let text = render_text(&result, &window(), &RecordFilter::default());
        assert!(text.contains("ALLOWED:\n  Request Count: 1\n  Unique Sessions: 1\n  GAC Points: 2"));
        assert!(text.contains("REJECTED:\n  Request Count: 1\n  Unique Sessions: 0\n  Total Output Tokens: 7\n  GAC Points: 2"));
        assert!(!text.contains("Input Tokens"));
    }
}
