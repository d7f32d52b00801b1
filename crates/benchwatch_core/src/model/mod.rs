//! Bench domain model.
//!
//! # Responsibility
//! - Define the bench record and its availability audit entry.
//!
//! # Invariants
//! - Every bench is identified by a store-assigned `BenchId`.
//! - Records are never deleted; availability history is append-only.

pub mod bench;
