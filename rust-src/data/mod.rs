//! Per-record parsing of stored proxy responses.

mod headers;
mod stream_parser;

pub use headers::parse_response_headers;
pub use stream_parser::parse_response_body;
