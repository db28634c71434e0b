//! gacu - token usage statistics for proxied Claude API requests.
//!
//! Reads the proxy's request log, extracts token usage from streamed
//! responses and reports it per rate-limit status.

mod aggregation;
mod cli;
mod commands;
mod config;
mod data;
mod error;
mod models;
mod report;
mod storage;

use std::process::ExitCode;


fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
