//! Storage layer for exported tables.
//!
//! This module writes the scalar series of a `TagIndex` as a delimited table.

pub mod csv;

// Re-export key types
pub use csv::{AlignmentPolicy, FIXED_HEADERS, ScalarTableExporter};
