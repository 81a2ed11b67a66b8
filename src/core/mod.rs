//! Core types for tb-export.
//!
//! This module contains the sample schema, the ordered tag/series container and
//! the read-only `TagIndex` produced by the loader.

pub mod index;
pub mod schema;
pub mod series;

// Re-export key types for convenience
pub use index::{RawSeriesSet, TagIndex};
pub use schema::{RawSummary, ScalarSample, SizeGuidance, Stepped, SummaryKind};
pub use series::OrderedSeries;
