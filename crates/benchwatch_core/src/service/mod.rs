//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the storage handle so callers never manage connections.

pub mod bench_service;
