//! Token usage extraction from streamed (SSE) response bodies.
//!
//! A body is a sequence of `data: {...}` event lines. Usage counters are
//! overwritten, never summed: `message_start` carries the initial accounting,
//! `message_delta` the final one, and any other event with a top-level
//! `usage` object overwrites whatever it reports. Keys absent from a usage
//! object leave the running value untouched.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::TokenUsage;


const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

type UsageObject = Map<String, Value>;


/// A decoded event line, reduced to where its usage lives.
#[derive(Debug, PartialEq)]
enum StreamEvent<'a> {
    /// `message.usage`
    MessageStart(Option<&'a UsageObject>),
    /// `delta.usage`, else top-level `usage`
    MessageDelta(Option<&'a UsageObject>),
    /// Any other type (or none); only a top-level `usage` matters.
    Other {
        event_type: &'a str,
        usage: Option<&'a UsageObject>,
    },
}


impl<'a> StreamEvent<'a> {
    fn from_object(data: &'a Map<String, Value>) -> Self {
        let event_type = data.get("type").and_then(Value::as_str).unwrap_or("unknown");

        match event_type {
            "message_start" => StreamEvent::MessageStart(
                data.get("message")
                    .and_then(|message| message.get("usage"))
                    .and_then(Value::as_object),
            ),
            "message_delta" => {
                let nested = data.get("delta").and_then(|delta| delta.get("usage"));
                let usage = nested.or_else(|| data.get("usage"));
                StreamEvent::MessageDelta(usage.and_then(Value::as_object))
            }
            _ => StreamEvent::Other {
                event_type,
                usage: data.get("usage").and_then(Value::as_object),
            },
        }
    }

    fn usage(&self) -> Option<&'a UsageObject> {
        match *self {
            StreamEvent::MessageStart(usage) => usage,
            StreamEvent::MessageDelta(usage) => usage,
            StreamEvent::Other { usage, .. } => usage,
        }
    }
}


/// Parse a streamed response body into a single token usage snapshot.
///
/// Never fails: empty bodies, unparseable lines and events without usage
/// all fall through to whatever has been accumulated (zeros by default).
pub fn parse_response_body(body: Option<&str>) -> TokenUsage {
    let mut usage = TokenUsage::default();

    let body = match body {
        Some(b) if !b.trim().is_empty() => b,
        _ => {
            debug!("response body is empty");
            return usage;
        }
    };

    for (index, raw_line) in body.lines().enumerate() {
        let line_num = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            debug!(line_num, line = %preview(line, 50), "skipping non-data line");
            continue;
        };

        if payload.is_empty() || payload == DONE_SENTINEL {
            debug!(line_num, payload, "skipping stream marker");
            continue;
        }

        let data = match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(data)) => data,
            Ok(other) => {
                debug!(line_num, kind = json_kind(&other), "skipping non-object event");
                continue;
            }
            Err(e) => {
                debug!(line_num, error = %e, payload = %preview(payload, 100), "skipping malformed event");
                continue;
            }
        };

        let event = StreamEvent::from_object(&data);
        debug!(line_num, ?event, "decoded event");

        if let Some(fields) = event.usage() {
            apply_usage(&mut usage, fields);
        }
    }

    debug!(?usage, "extracted token usage");
    usage
}


/// Overwrite each counter present in `fields`.
fn apply_usage(usage: &mut TokenUsage, fields: &UsageObject) {
    let counters: [(&str, &mut u64); 4] = [
        ("input_tokens", &mut usage.input_tokens),
        ("cache_creation_input_tokens", &mut usage.cache_creation_input_tokens),
        ("cache_read_input_tokens", &mut usage.cache_read_input_tokens),
        ("output_tokens", &mut usage.output_tokens),
    ];

    for (key, slot) in counters {
        if let Some(value) = fields.get(key) {
            *slot = value.as_u64().unwrap_or_else(|| {
                debug!(key, %value, "non-integer counter, using 0");
                0
            });
        }
    }
}


fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}


fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
