//! Per rate-limit-status aggregation of request records.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::config::{POINTS_PER_REQUEST, TOKENS_PER_POINT};
use crate::data::{parse_response_body, parse_response_headers};
use crate::models::{RateLimitStatus, RequestRecord, TokenUsage};


/// Running totals for one rate-limit status bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusStats {
    pub request_count: u64,
    pub tokens: TokenUsage,
    pub unique_sessions: HashSet<String>,
}


impl StatusStats {
    /// Add one request's usage. Tokens are summed, sessions deduplicated.
    pub fn add_request(&mut self, usage: TokenUsage, session_id: Option<&str>) {
        self.request_count += 1;
        self.tokens += usage;

        if let Some(id) = session_id.filter(|id| !id.is_empty()) {
            if !self.unique_sessions.contains(id) {
                self.unique_sessions.insert(id.to_string());
            }
        }
    }

    pub fn merge(&mut self, other: StatusStats) {
        self.request_count = self.request_count.saturating_add(other.request_count);
        self.tokens += other.tokens;
        self.unique_sessions.extend(other.unique_sessions);
    }

    pub fn unique_session_count(&self) -> usize {
        self.unique_sessions.len()
    }

    /// `round(total_tokens / 3072) + request_count * 2`, rounding half to even.
    pub fn points(&self) -> u64 {
        round_half_even_div(self.tokens.total_tokens(), TOKENS_PER_POINT)
            .saturating_add(self.request_count.saturating_mul(POINTS_PER_REQUEST))
    }
}


/// Integer division rounded to the nearest integer, ties to even.
fn round_half_even_div(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator) * 2;

    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}


/// Result of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    pub by_status: HashMap<RateLimitStatus, StatusStats>,
    pub total_records: u64,
    /// Records whose status resolved to `unknown`.
    pub parse_errors: u64,
}


impl AnalysisResult {
    /// Fold one parsed record into its status bucket.
    pub fn record(&mut self, usage: TokenUsage, status: RateLimitStatus, session_id: Option<&str>) {
        self.total_records += 1;
        if status.is_unknown() {
            self.parse_errors += 1;
        }

        self.by_status
            .entry(status)
            .or_default()
            .add_request(usage, session_id);
    }

    /// Combine a partial result computed over a disjoint batch.
    pub fn merge(mut self, other: AnalysisResult) -> AnalysisResult {
        self.total_records += other.total_records;
        self.parse_errors += other.parse_errors;

        for (status, stats) in other.by_status {
            self.by_status.entry(status).or_default().merge(stats);
        }

        self
    }

    #[cfg(test)]
    pub fn get(&self, status: &str) -> Option<&StatusStats> {
        self.by_status.get(&RateLimitStatus::new(status))
    }

    /// Buckets in display order: well-known statuses first, then the rest sorted.
    pub fn ordered(&self) -> Vec<(&RateLimitStatus, &StatusStats)> {
        let mut buckets: Vec<_> = self.by_status.iter().collect();
        buckets.sort_by_key(|(status, _)| {
            let rank = RateLimitStatus::DISPLAY_ORDER
                .iter()
                .position(|known| *known == status.as_str())
                .unwrap_or(RateLimitStatus::DISPLAY_ORDER.len());
            (rank, status.as_str().to_string())
        });
        buckets
    }
}


fn analyze_record(result: &mut AnalysisResult, record: &RequestRecord) {
    let usage = parse_response_body(record.response_body.as_deref());
    let status = parse_response_headers(record.response_headers.as_deref());

    debug!(
        timestamp = record.timestamp.as_deref().unwrap_or(""),
        endpoint = record.endpoint.as_deref().unwrap_or(""),
        model = record.model.as_deref().unwrap_or(""),
        session_id = record.session_id.as_deref().unwrap_or(""),
        %status,
        ?usage,
        "processed record"
    );

    result.record(usage, status, record.session());
}


/// Parse and aggregate a batch of records.
///
/// With `parallel`, each rayon worker folds into its own partial result and
/// the partials are merged; the outcome is identical to the sequential pass.
pub fn aggregate_records(records: &[RequestRecord], parallel: bool) -> AnalysisResult {
    if parallel {
        records
            .par_iter()
            .fold(AnalysisResult::default, |mut partial, record| {
                analyze_record(&mut partial, record);
                partial
            })
            .reduce(AnalysisResult::default, AnalysisResult::merge)
    } else {
        let mut result = AnalysisResult::default();
        for record in records {
            analyze_record(&mut result, record);
        }
        result
    }
}
