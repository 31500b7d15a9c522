//! Application constants for the crash uploader
//!
//! This module contains source column names, wire identifiers and the
//! default values used throughout the upload pipeline.

// =============================================================================
// Source Columns
// =============================================================================

/// Column names expected in collision-report files
pub mod columns {
    pub const CRASH_DATE: &str = "CRASH DATE";
    pub const CRASH_TIME: &str = "CRASH TIME";

    pub const PERSONS_INJURED: &str = "NUMBER OF PERSONS INJURED";
    pub const PERSONS_KILLED: &str = "NUMBER OF PERSONS KILLED";
    pub const PEDESTRIANS_INJURED: &str = "NUMBER OF PEDESTRIANS INJURED";
    pub const PEDESTRIANS_KILLED: &str = "NUMBER OF PEDESTRIANS KILLED";
    pub const CYCLISTS_INJURED: &str = "NUMBER OF CYCLIST INJURED";
    pub const CYCLISTS_KILLED: &str = "NUMBER OF CYCLIST KILLED";
    pub const MOTORISTS_INJURED: &str = "NUMBER OF MOTORIST INJURED";
    pub const MOTORISTS_KILLED: &str = "NUMBER OF MOTORIST KILLED";

    /// Every column the normalizer reads, in wire field order
    pub const ALL: &[&str] = &[
        CRASH_DATE,
        CRASH_TIME,
        PERSONS_INJURED,
        PERSONS_KILLED,
        PEDESTRIANS_INJURED,
        PEDESTRIANS_KILLED,
        CYCLISTS_INJURED,
        CYCLISTS_KILLED,
        MOTORISTS_INJURED,
        MOTORISTS_KILLED,
    ];
}

// =============================================================================
// Field Formats
// =============================================================================

/// Separator between month, day and year in `MM/DD/YYYY`
pub const DATE_SEPARATOR: char = '/';

/// Separator between hours and minutes in `HH:MM`
pub const TIME_SEPARATOR: char = ':';

/// Digit count of a date once separators are removed (`MMDDYYYY`)
pub const DATE_DIGITS: usize = 8;

/// Accepted digit counts of a time once the separator is removed (`HMM`/`HHMM`)
pub const TIME_MIN_DIGITS: usize = 3;
pub const TIME_MAX_DIGITS: usize = 4;

// =============================================================================
// Remote Service
// =============================================================================

/// Fully-qualified gRPC service name
pub const SERVICE_NAME: &str = "datatransfer.DataTransfer";

/// Path of the client-streaming upload method
pub const STREAM_DATA_PATH: &str = "/datatransfer.DataTransfer/StreamData";

// =============================================================================
// Defaults
// =============================================================================

/// Default aggregation service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:50051";

/// Default input file
pub const DEFAULT_INPUT_FILE: &str = "data.csv";

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Records buffered between the producer and the streaming call
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Records between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Skip reasons kept in producer statistics before truncating
pub const MAX_RECORDED_SKIPS: usize = 100;
