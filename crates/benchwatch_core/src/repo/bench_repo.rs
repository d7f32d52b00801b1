//! Bench repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/get/update APIs over `benches` storage.
//! - Append one `bench_updates` row per availability change.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - An availability change and its audit row commit together or not at all.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Rows are decoded by column name.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::bench::{Bench, BenchId, BenchUpdate, NewBench, ANONYMOUS};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BENCH_SELECT_SQL: &str = "SELECT
    id,
    latitude,
    longitude,
    description,
    is_available,
    last_updated,
    added_by
FROM benches";

const BENCH_UPDATE_SELECT_SQL: &str = "SELECT
    id,
    bench_id,
    is_available,
    updated_at,
    updated_by
FROM bench_updates";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "benches",
        &[
            "id",
            "latitude",
            "longitude",
            "description",
            "is_available",
            "last_updated",
            "added_by",
        ],
    ),
    (
        "bench_updates",
        &["id", "bench_id", "is_available", "updated_at", "updated_by"],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for bench persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// The storage file could not be opened or bootstrapped.
    StorageUnavailable(DbError),
    /// An insert, update or commit did not go through.
    StorageWriteFailed(rusqlite::Error),
    /// A read query failed.
    Db(DbError),
    /// The bench targeted by a write does not exist.
    NotFound(BenchId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "bench storage unavailable: {err}"),
            Self::StorageWriteFailed(err) => write!(f, "bench storage write failed: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "bench not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted bench data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::StorageWriteFailed(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for bench persistence.
pub trait BenchRepository {
    /// Inserts a bench stamped with `timestamp` and returns its new id.
    fn create_bench(&self, bench: &NewBench, timestamp: &str) -> RepoResult<BenchId>;
    /// Lists every bench in insertion order.
    fn list_benches(&self) -> RepoResult<Vec<Bench>>;
    /// Gets one bench, `None` when the id is unknown.
    fn get_bench(&self, id: BenchId) -> RepoResult<Option<Bench>>;
    /// Sets the availability flag and appends the audit row in one transaction.
    fn update_availability(
        &mut self,
        id: BenchId,
        is_available: bool,
        updated_by: &str,
        timestamp: &str,
    ) -> RepoResult<BenchUpdate>;
    /// Lists audit rows for one bench, oldest first.
    fn list_updates(&self, bench_id: BenchId) -> RepoResult<Vec<BenchUpdate>>;
}

/// SQLite-backed bench repository.
pub struct SqliteBenchRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBenchRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match the bench layout.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BenchRepository for SqliteBenchRepository<'_> {
    fn create_bench(&self, bench: &NewBench, timestamp: &str) -> RepoResult<BenchId> {
        self.conn
            .execute(
                "INSERT INTO benches (
                    latitude,
                    longitude,
                    description,
                    last_updated,
                    added_by
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    bench.latitude,
                    bench.longitude,
                    bench.description.as_str(),
                    timestamp,
                    bench.added_by.as_str(),
                ],
            )
            .map_err(RepoError::StorageWriteFailed)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_benches(&self) -> RepoResult<Vec<Bench>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BENCH_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut benches = Vec::new();

        while let Some(row) = rows.next()? {
            benches.push(parse_bench_row(row)?);
        }

        Ok(benches)
    }

    fn get_bench(&self, id: BenchId) -> RepoResult<Option<Bench>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BENCH_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_bench_row(row)?));
        }

        Ok(None)
    }

    fn update_availability(
        &mut self,
        id: BenchId,
        is_available: bool,
        updated_by: &str,
        timestamp: &str,
    ) -> RepoResult<BenchUpdate> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::StorageWriteFailed)?;

        let changed = tx
            .execute(
                "UPDATE benches
                 SET
                    is_available = ?1,
                    last_updated = ?2
                 WHERE id = ?3;",
                params![bool_to_int(is_available), timestamp, id],
            )
            .map_err(RepoError::StorageWriteFailed)?;

        // Dropping `tx` rolls back, so no audit row is left behind.
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.execute(
            "INSERT INTO bench_updates (
                bench_id,
                is_available,
                updated_at,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4);",
            params![id, bool_to_int(is_available), timestamp, updated_by],
        )
        .map_err(RepoError::StorageWriteFailed)?;
        let update_id = tx.last_insert_rowid();

        tx.commit().map_err(RepoError::StorageWriteFailed)?;

        Ok(BenchUpdate {
            id: update_id,
            bench_id: id,
            is_available,
            updated_at: timestamp.to_string(),
            updated_by: updated_by.to_string(),
        })
    }

    fn list_updates(&self, bench_id: BenchId) -> RepoResult<Vec<BenchUpdate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BENCH_UPDATE_SELECT_SQL} WHERE bench_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([bench_id])?;
        let mut updates = Vec::new();

        while let Some(row) = rows.next()? {
            updates.push(parse_bench_update_row(row)?);
        }

        Ok(updates)
    }
}

/// Returns whether a bench with `id` exists on this connection.
pub fn bench_exists(conn: &Connection, id: BenchId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM benches WHERE id = ?1;", [id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn parse_bench_row(row: &Row<'_>) -> RepoResult<Bench> {
    let id: BenchId = row.get("id")?;
    let latitude = row
        .get::<_, Option<f64>>("latitude")?
        .ok_or_else(|| RepoError::InvalidData(format!("null latitude for bench {id}")))?;
    let longitude = row
        .get::<_, Option<f64>>("longitude")?
        .ok_or_else(|| RepoError::InvalidData(format!("null longitude for bench {id}")))?;

    Ok(Bench {
        id,
        latitude,
        longitude,
        description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
        is_available: parse_flag(row.get("is_available")?, "benches.is_available")?,
        last_updated: row
            .get::<_, Option<String>>("last_updated")?
            .unwrap_or_default(),
        added_by: row
            .get::<_, Option<String>>("added_by")?
            .unwrap_or_else(|| ANONYMOUS.to_string()),
    })
}

fn parse_bench_update_row(row: &Row<'_>) -> RepoResult<BenchUpdate> {
    Ok(BenchUpdate {
        id: row.get("id")?,
        bench_id: row.get("bench_id")?,
        is_available: parse_flag(row.get("is_available")?, "bench_updates.is_available")?,
        updated_at: row.get::<_, Option<String>>("updated_at")?.unwrap_or_default(),
        updated_by: row
            .get::<_, Option<String>>("updated_by")?
            .unwrap_or_else(|| ANONYMOUS.to_string()),
    })
}

fn parse_flag(value: Option<i64>, column: &str) -> RepoResult<bool> {
    match value {
        Some(0) => Ok(false),
        // Column default is 1; a NULL flag reads as available.
        Some(1) | None => Ok(true),
        Some(other) => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
