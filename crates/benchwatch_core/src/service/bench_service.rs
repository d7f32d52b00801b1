//! Bench use-case service.
//!
//! # Responsibility
//! - Provide the bench operations used by the web and CLI front ends.
//! - Own the explicit storage handle (database path + clock).
//!
//! # Invariants
//! - Every operation opens its own connection and drops it before
//!   returning, on success and failure alike. No pooling.
//! - Timestamps are local wall-clock time in `TIMESTAMP_FORMAT`.
//! - Storage errors propagate unchanged; nothing is retried.

use crate::db::open_db;
use crate::model::bench::{availability_label, Bench, BenchId, BenchUpdate, NewBench};
use crate::repo::bench_repo::{
    bench_exists, BenchRepository, RepoError, RepoResult, SqliteBenchRepository,
};
use log::{error, info};
use mockable::{Clock, DefaultClock};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `strftime`-style layout of `last_updated` / `updated_at` values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default database file name, relative to the working directory.
pub const DEFAULT_DB_FILE_NAME: &str = "benches.db";

/// Persistence service over a single SQLite file.
#[derive(Clone)]
pub struct BenchService {
    db_path: PathBuf,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl BenchService {
    /// Creates a service for `db_path` using the system clock.
    ///
    /// Does not touch the file; call [`BenchService::initialize_schema`]
    /// at startup.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_clock(db_path, Arc::new(DefaultClock))
    }

    /// Creates a service with a caller-provided clock.
    pub fn with_clock(db_path: impl Into<PathBuf>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            db_path: db_path.into(),
            clock,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Ensures both tables exist. Safe to call on every process start.
    pub fn initialize_schema(&self) -> RepoResult<()> {
        let mut conn = self.connect()?;
        SqliteBenchRepository::try_new(&mut conn)?;
        info!(
            "event=schema_init module=service status=ok db_path={}",
            self.db_path.display()
        );
        Ok(())
    }

    /// Inserts a bench and returns its new id.
    ///
    /// Coordinates are not range-checked; only storage constraints apply.
    pub fn create_bench(
        &self,
        latitude: f64,
        longitude: f64,
        description: &str,
        added_by: &str,
    ) -> RepoResult<BenchId> {
        let bench = NewBench::new(latitude, longitude)
            .with_description(description)
            .with_added_by(added_by);
        self.create(&bench)
    }

    /// Inserts a prepared [`NewBench`] and returns its new id.
    ///
    /// Surrounding whitespace is trimmed from the description.
    pub fn create(&self, bench: &NewBench) -> RepoResult<BenchId> {
        let bench = NewBench {
            description: bench.description.trim().to_string(),
            ..bench.clone()
        };
        let timestamp = self.now();
        let result = self.with_repo(|repo| repo.create_bench(&bench, &timestamp));
        match &result {
            Ok(id) => info!("event=bench_create module=service status=ok bench_id={id}"),
            Err(err) => error!("event=bench_create module=service status=error error={err}"),
        }
        result
    }

    /// Returns every bench; empty when none exist.
    pub fn list_benches(&self) -> RepoResult<Vec<Bench>> {
        self.with_repo(|repo| repo.list_benches())
    }

    /// Marks a bench available or occupied and records the change.
    ///
    /// # Errors
    /// - `NotFound` when no bench has `bench_id`; nothing is written.
    /// - `StorageWriteFailed` when the transaction does not commit.
    pub fn update_availability(
        &self,
        bench_id: BenchId,
        is_available: bool,
        updated_by: &str,
    ) -> RepoResult<BenchUpdate> {
        let timestamp = self.now();
        let result = self.with_repo(|repo| {
            repo.update_availability(bench_id, is_available, updated_by, &timestamp)
        });
        match &result {
            Ok(_) => info!(
                "event=bench_availability module=service status=ok bench_id={bench_id} state={}",
                availability_label(is_available)
            ),
            Err(err) => error!(
                "event=bench_availability module=service status=error bench_id={bench_id} error={err}"
            ),
        }
        result
    }

    /// Looks up one bench; `None` when the id is unknown.
    pub fn find_bench(&self, bench_id: BenchId) -> RepoResult<Option<Bench>> {
        self.with_repo(|repo| repo.get_bench(bench_id))
    }

    /// Returns the availability audit trail for one bench, oldest first.
    ///
    /// # Errors
    /// - `NotFound` when no bench has `bench_id`.
    pub fn bench_history(&self, bench_id: BenchId) -> RepoResult<Vec<BenchUpdate>> {
        let mut conn = self.connect()?;
        if !bench_exists(&conn, bench_id)? {
            return Err(RepoError::NotFound(bench_id));
        }
        let repo = SqliteBenchRepository::try_new(&mut conn)?;
        repo.list_updates(bench_id)
    }

    fn with_repo<T>(
        &self,
        op: impl FnOnce(&mut SqliteBenchRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.connect()?;
        let mut repo = SqliteBenchRepository::try_new(&mut conn)?;
        op(&mut repo)
    }

    fn connect(&self) -> RepoResult<Connection> {
        open_db(&self.db_path).map_err(RepoError::StorageUnavailable)
    }

    fn now(&self) -> String {
        self.clock.local().format(TIMESTAMP_FORMAT).to_string()
    }
}
