//! Record source: the proxy's SQLite request log.

mod database;

pub use database::{fetch_request_logs, open_database};
