//! SQLite access to the proxy's request log database.

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use tracing::info;

use crate::config::{RecordFilter, TimeWindow};
use crate::error::{AnalyzerError, Result};
use crate::models::RequestRecord;


const REQUEST_LOGS_QUERY: &str = "
    SELECT
        original_response_body,
        original_response_headers,
        model,
        timestamp,
        endpoint,
        status_code,
        session_id
    FROM request_logs
    WHERE timestamp >= ?1
      AND timestamp <= ?2
      AND instr(endpoint, ?3) > 0
      AND status_code = 200
      AND (model IS NULL OR instr(model, ?4) = 0)
    ORDER BY timestamp";


/// Open the log database read-only.
///
/// A missing file is an error; the analyzer never creates databases.
pub fn open_database(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| AnalyzerError::Database {
        path: db_path.to_path_buf(),
        source,
    })
}


/// Fetch successful, non-excluded requests to the configured host within `window`.
pub fn fetch_request_logs(
    conn: &Connection,
    window: &TimeWindow,
    filter: &RecordFilter,
) -> Result<Vec<RequestRecord>> {
    let mut stmt = conn.prepare(REQUEST_LOGS_QUERY)?;

    let records = stmt
        .query_map(
            params![window.start, window.end, filter.endpoint_host, filter.excluded_model],
            |row| {
                Ok(RequestRecord {
                    response_body: row.get(0)?,
                    response_headers: row.get(1)?,
                    model: row.get(2)?,
                    timestamp: row.get(3)?,
                    endpoint: row.get(4)?,
                    status_code: row.get(5)?,
                    session_id: row.get(6)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    info!(count = records.len(), start = %window.start, end = %window.end, "fetched request logs");

    Ok(records)
}
