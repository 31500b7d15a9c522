//! Tests for the record normalizer module
//!
//! Unit tests for field parsing, row normalization and lazy production.


// Test helper functions and fixtures
use crate::app::models::RawRow;
use crate::constants::columns;

/// Create a row with the given date and time and no count columns
pub fn create_row(date: &str, time: &str) -> RawRow {
    RawRow::from_pairs([(columns::CRASH_DATE, date), (columns::CRASH_TIME, time)])
}

/// Create a row with every column populated
pub fn create_full_row(date: &str, time: &str, counts: [&str; 8]) -> RawRow {
    let mut row = create_row(date, time);
    for (name, value) in columns::ALL[2..].iter().zip(counts) {
        row.insert(*name, value);
    }
    row
}

/// Rows where the second and fourth have an invalid date or time
pub fn create_mixed_rows() -> Vec<RawRow> {
    vec![
        create_row("01/15/2021", "8:05"),
        create_row("", "8:05"),
        create_row("02/20/2021", "17:40"),
        create_row("03/01/2021", "noon"),
        create_row("12/31/2021", "23:59"),
    ]
}
