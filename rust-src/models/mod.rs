//! Data models for request logs and token accounting.

mod usage_record;

pub use usage_record::{RateLimitStatus, RequestRecord, TokenUsage};
