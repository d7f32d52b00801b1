//! Bench records and availability audit entries.
//!
//! # Invariants
//! - `id` is assigned by storage on insert and never changes afterwards.
//! - `latitude` and `longitude` are always present.
//! - A `BenchUpdate` is immutable once written.

use serde::{Deserialize, Serialize};

/// Store-assigned, monotonically increasing bench identifier.
pub type BenchId = i64;

/// Name recorded when a caller does not identify themselves.
pub const ANONYMOUS: &str = "Anonymous";

/// A tracked park bench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bench {
    pub id: BenchId,
    pub latitude: f64,
    pub longitude: f64,
    /// Free text; empty when the reporter left it blank.
    pub description: String,
    /// `true` when the bench is free, `false` when occupied.
    pub is_available: bool,
    /// Local wall-clock time of the last write, `YYYY-MM-DD HH:MM:SS`.
    pub last_updated: String,
    pub added_by: String,
}

impl Bench {
    /// Human-readable availability state.
    pub fn status_label(&self) -> &'static str {
        availability_label(self.is_available)
    }
}

/// Insert request for a new bench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBench {
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub added_by: String,
}

impl NewBench {
    /// Creates a request with an empty description and the anonymous reporter.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            description: String::new(),
            added_by: ANONYMOUS.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_added_by(mut self, added_by: impl Into<String>) -> Self {
        self.added_by = added_by.into();
        self
    }
}

/// One row of the availability audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchUpdate {
    pub id: i64,
    pub bench_id: BenchId,
    pub is_available: bool,
    pub updated_at: String,
    pub updated_by: String,
}

/// Maps an availability flag to `available` / `occupied`.
pub fn availability_label(is_available: bool) -> &'static str {
    if is_available {
        "available"
    } else {
        "occupied"
    }
}
