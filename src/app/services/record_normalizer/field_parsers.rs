//! Field parsing utilities for collision-report rows
//!
//! Pure, stateless conversions from raw text to the numeric values carried by
//! [`CollisionRecord`](crate::CollisionRecord). Dates and times either parse or
//! are rejected with a [`FieldError`]; counts never fail and fall back to zero.
//!
//! None of these functions check semantic ranges: `13/40/2023` and `99:99`
//! are accepted as long as their digit counts match.

use crate::constants::{
    DATE_DIGITS, DATE_SEPARATOR, TIME_MAX_DIGITS, TIME_MIN_DIGITS, TIME_SEPARATOR,
};
use std::borrow::Cow;

/// Why a date or time field could not be parsed
///
/// The variants exist for diagnostics only. Callers must treat all of them
/// the same way: the row is invalid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Field absent or empty
    #[error("value is empty")]
    Missing,

    /// Wrong number of characters once separators are removed
    #[error("'{value}' has {found} digits, expected {expected}")]
    WrongLength {
        value: String,
        expected: &'static str,
        found: usize,
    },

    /// Right length but not all ASCII digits
    #[error("'{value}' contains non-digit characters")]
    NonNumeric { value: String },
}

/// Result of parsing a date or time field
pub type FieldResult = std::result::Result<i32, FieldError>;

/// Parse `MM/DD/YYYY` into an integer `YYYYMMDD`
///
/// Every `/` is removed and exactly eight digits must remain; they are
/// reinterpreted positionally as `MMDDYYYY`. Only when that leaves the wrong
/// count are single-character month or day segments zero-padded, so
/// `1/2/2020` is read as `01/02/2020` while `123/4/2020` stays `12342020`.
///
/// ```
/// use crash_uploader::app::services::record_normalizer::field_parsers::parse_date;
///
/// assert_eq!(parse_date("05/17/2023"), Ok(20230517));
/// assert!(parse_date("2023-05-17").is_err());
/// ```
pub fn parse_date(text: &str) -> FieldResult {
    if text.is_empty() {
        return Err(FieldError::Missing);
    }

    let mut digits: String = text.chars().filter(|&c| c != DATE_SEPARATOR).collect();
    if digits.chars().count() != DATE_DIGITS {
        if let Some(padded) = pad_date_segments(text) {
            digits = padded;
        }
    }

    let found = digits.chars().count();
    if found != DATE_DIGITS {
        return Err(FieldError::WrongLength {
            value: text.to_string(),
            expected: "8",
            found,
        });
    }
    if !is_all_digits(&digits) {
        return Err(FieldError::NonNumeric {
            value: text.to_string(),
        });
    }

    // ASCII digits only from here, so byte slicing is safe
    let month = digits_value(&digits[0..2]);
    let day = digits_value(&digits[2..4]);
    let year = digits_value(&digits[4..8]);

    Ok(year * 10_000 + month * 100 + day)
}

/// Parse `H:MM` or `HH:MM` into an integer `HHMM`
///
/// A single-digit hour is zero-padded, the `:` is removed, and three or four
/// digits must remain. Text without a separator is accepted when its digit
/// count is in range, so `"123"` parses as `123`.
///
/// ```
/// use crash_uploader::app::services::record_normalizer::field_parsers::parse_time;
///
/// assert_eq!(parse_time("9:30"), Ok(930));
/// assert_eq!(parse_time("13:45"), Ok(1345));
/// assert!(parse_time("").is_err());
/// ```
pub fn parse_time(text: &str) -> FieldResult {
    if text.is_empty() {
        return Err(FieldError::Missing);
    }

    let padded: Cow<'_, str> = match text.split_once(TIME_SEPARATOR) {
        Some((hours, minutes))
            if !minutes.contains(TIME_SEPARATOR) && hours.chars().count() == 1 =>
        {
            Cow::Owned(format!("0{text}"))
        }
        _ => Cow::Borrowed(text),
    };

    let digits: String = padded.chars().filter(|&c| c != TIME_SEPARATOR).collect();
    let found = digits.chars().count();
    if !(TIME_MIN_DIGITS..=TIME_MAX_DIGITS).contains(&found) {
        return Err(FieldError::WrongLength {
            value: text.to_string(),
            expected: "3 or 4",
            found,
        });
    }
    if !is_all_digits(&digits) {
        return Err(FieldError::NonNumeric {
            value: text.to_string(),
        });
    }

    Ok(digits_value(&digits))
}

/// Parse a count field, defaulting to zero
///
/// Empty, non-numeric, negative or overflowing text yields `0`. This never
/// fails and never logs.
pub fn parse_count(text: &str) -> i32 {
    text.trim()
        .parse::<u32>()
        .ok()
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0)
}

/// `M/D/YYYY` with one-character segments padded, or `None` unless there are
/// exactly three segments
fn pad_date_segments(text: &str) -> Option<String> {
    let segments: Vec<&str> = text.split(DATE_SEPARATOR).collect();
    if segments.len() != 3 {
        return None;
    }
    let month = pad_single_char(segments[0]);
    let day = pad_single_char(segments[1]);
    Some([month.as_ref(), day.as_ref(), segments[2]].concat())
}

fn pad_single_char(segment: &str) -> Cow<'_, str> {
    if segment.chars().count() == 1 {
        Cow::Owned(format!("0{segment}"))
    } else {
        Cow::Borrowed(segment)
    }
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Value of a short run of ASCII digits
fn digits_value(digits: &str) -> i32 {
    digits
        .bytes()
        .fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
}
