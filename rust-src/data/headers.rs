//! Rate-limit status classification from stored response headers.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::RATE_LIMIT_STATUS_HEADER;
use crate::models::RateLimitStatus;


/// Parse the JSON header map of a response into its rate-limit status.
///
/// Empty input, undecodable JSON and a missing or non-string header all
/// resolve to `unknown`.
pub fn parse_response_headers(headers: Option<&str>) -> RateLimitStatus {
    let headers = match headers {
        Some(h) if !h.trim().is_empty() => h,
        _ => return RateLimitStatus::unknown(),
    };

    let map = match serde_json::from_str::<Value>(headers) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("response headers are not a JSON object");
            return RateLimitStatus::unknown();
        }
        Err(e) => {
            warn!(error = %e, "failed to decode response headers");
            return RateLimitStatus::unknown();
        }
    };

    match find_header(&map, RATE_LIMIT_STATUS_HEADER).and_then(Value::as_str) {
        Some(status) => RateLimitStatus::new(status),
        None => RateLimitStatus::unknown(),
    }
}


/// Exact key first, then an ASCII case-insensitive match.
fn find_header<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}
