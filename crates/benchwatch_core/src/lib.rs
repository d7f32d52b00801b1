//! Core persistence for benchwatch.
//! This crate is the single source of truth for bench records and their
//! availability history.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogEcho};
pub use model::bench::{availability_label, Bench, BenchId, BenchUpdate, NewBench, ANONYMOUS};
pub use repo::bench_repo::{BenchRepository, RepoError, RepoResult, SqliteBenchRepository};
pub use service::bench_service::{BenchService, DEFAULT_DB_FILE_NAME, TIMESTAMP_FORMAT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
