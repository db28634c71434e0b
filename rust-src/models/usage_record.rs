//! Request log records and the token/status types derived from them.

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;


/// Token accounting for one request/response exchange, or a running sum of them.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
}


impl TokenUsage {
    /// Calculate total tokens across all categories, saturating at `u64::MAX`.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.output_tokens)
    }
}


impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .saturating_add(other.cache_creation_input_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .saturating_add(other.cache_read_input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}


/// Normalized (lowercase) rate-limit status label.
///
/// The domain is open: anything the upstream sends is kept, `unknown` marks
/// records whose headers were missing or unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RateLimitStatus(String);


impl RateLimitStatus {
    pub const ALLOWED: &'static str = "allowed";
    pub const ALLOWED_WARNING: &'static str = "allowed_warning";
    pub const REJECTED: &'static str = "rejected";
    pub const UNKNOWN: &'static str = "unknown";

    /// Display order for the well-known statuses; others follow sorted.
    pub const DISPLAY_ORDER: [&'static str; 4] =
        [Self::ALLOWED, Self::ALLOWED_WARNING, Self::REJECTED, Self::UNKNOWN];

    pub fn new(label: &str) -> Self {
        Self(label.trim().to_lowercase())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl fmt::Display for RateLimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


/// One row of the proxy's `request_logs` table, as the analyzer sees it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestRecord {
    pub response_body: Option<String>,
    pub response_headers: Option<String>,
    pub session_id: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: Option<i64>,
    pub timestamp: Option<String>,
}


impl RequestRecord {
    /// Session id, if present and non-empty.
    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            cache_creation_input_tokens: 50,
            cache_read_input_tokens: 25,
            output_tokens: 200,
        };
        assert_eq!(usage.total_tokens(), 375);
        assert_eq!(TokenUsage::default().total_tokens(), 0);
    }

    #[test]
    fn test_token_usage_add_assign() {
        let mut total = TokenUsage { input_tokens: 1, output_tokens: 2, ..Default::default() };
        total += TokenUsage { input_tokens: 10, cache_read_input_tokens: 5, ..Default::default() };
        assert_eq!(
            total,
            TokenUsage {
                input_tokens: 11,
                cache_creation_input_tokens: 0,
                cache_read_input_tokens: 5,
                output_tokens: 2,
            }
        );
    }

    #[test]
    fn test_token_usage_saturates() {
        let mut total = TokenUsage { output_tokens: u64::MAX, ..Default::default() };
        assert_eq!(
            TokenUsage { input_tokens: 5, ..total }.total_tokens(),
            u64::MAX
        );

        total += TokenUsage { input_tokens: 5, output_tokens: 1, ..Default::default() };
        assert_eq!(total.output_tokens, u64::MAX);
        assert_eq!(total.input_tokens, 5);
    }

    #[test]
    fn test_status_normalization() {
        assert_eq!(RateLimitStatus::new(" Allowed_Warning ").as_str(), "allowed_warning");
        assert!(RateLimitStatus::unknown().is_unknown());
        assert_eq!(RateLimitStatus::new("REJECTED").to_string(), "rejected");
    }

    #[test]
    fn test_session_ignores_empty() {
        let mut record = RequestRecord { session_id: Some(String::new()), ..Default::default() };
        assert_eq!(record.session(), None);

        record.session_id = Some("sess-1".to_string());
        assert_eq!(record.session(), Some("sess-1"));

        record.session_id = None;
        assert_eq!(record.session(), None);
    }
}
