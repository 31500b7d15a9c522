//! Record normalization for collision-report rows
//!
//! This module turns raw textual rows into validated [`CollisionRecord`]
//! values and exposes them as a lazy, single-pass sequence.
//!
//! ## Architecture
//!
//! - [`field_parsers`] - Pure date, time and count conversions
//! - [`record_parser`] - One row to one record (or a rejection)
//! - [`producer`] - Lazy iterator that filters invalid rows with a diagnostic
//! - [`stats`] - Row accounting for one pass
//!
//! ## Error policy
//!
//! Invalid dates and times only ever suppress the row they occur in. Bad count
//! values are absorbed silently and read as zero. Nothing in this module
//! retries or aborts because of row content.
//!
//! [`CollisionRecord`]: crate::CollisionRecord

pub mod field_parsers;
pub mod producer;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use field_parsers::{FieldError, FieldResult, parse_count, parse_date, parse_time};
pub use producer::{RecordProducer, RowItem};
pub use record_parser::{RowRejection, normalize_row};
pub use stats::ProduceStats;
