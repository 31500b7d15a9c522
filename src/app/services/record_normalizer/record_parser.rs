//! Individual row normalization
//!
//! Converts one [`RawRow`] into a [`CollisionRecord`]. Date and time are
//! checked first; counts are only read once both are valid.

use super::field_parsers::{FieldError, parse_count, parse_date, parse_time};
use crate::app::models::{CollisionRecord, RawRow};
use crate::constants::columns;

/// A row that cannot become a record, and why
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct RowRejection {
    /// Column that failed to parse
    pub field: &'static str,

    /// Underlying field error
    #[source]
    pub reason: FieldError,
}

/// Normalize a single row
pub fn normalize_row(row: &RawRow) -> Result<CollisionRecord, RowRejection> {
    let crash_date = parse_date(row.get(columns::CRASH_DATE)).map_err(|reason| RowRejection {
        field: columns::CRASH_DATE,
        reason,
    })?;
    let crash_time = parse_time(row.get(columns::CRASH_TIME)).map_err(|reason| RowRejection {
        field: columns::CRASH_TIME,
        reason,
    })?;

    Ok(CollisionRecord {
        crash_date,
        crash_time,
        persons_injured: parse_count(row.get(columns::PERSONS_INJURED)),
        persons_killed: parse_count(row.get(columns::PERSONS_KILLED)),
        pedestrians_injured: parse_count(row.get(columns::PEDESTRIANS_INJURED)),
        pedestrians_killed: parse_count(row.get(columns::PEDESTRIANS_KILLED)),
        cyclists_injured: parse_count(row.get(columns::CYCLISTS_INJURED)),
        cyclists_killed: parse_count(row.get(columns::CYCLISTS_KILLED)),
        motorists_injured: parse_count(row.get(columns::MOTORISTS_INJURED)),
        motorists_killed: parse_count(row.get(columns::MOTORISTS_KILLED)),
    })
}
