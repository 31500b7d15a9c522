//! Production statistics for the record normalizer
//!
//! Tracks how many rows were read, how many became records and why the
//! others were skipped.

use crate::constants::MAX_RECORDED_SKIPS;

/// Row accounting for one pass over a row source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceStats {
    /// Rows pulled from the source, malformed lines included
    pub rows_read: usize,

    /// Records handed to the consumer
    pub records_produced: usize,

    /// Rows dropped for an invalid date or time
    pub rows_skipped: usize,

    /// Lines the row source could not decode
    pub malformed_lines: usize,

    /// First skip reasons, for reporting
    pub skip_reasons: Vec<String>,
}

impl ProduceStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            rows_read: 0,
            records_produced: 0,
            rows_skipped: 0,
            malformed_lines: 0,
            skip_reasons: Vec::new(),
        }
    }

    /// Record a row dropped by normalization
    pub fn record_skip(&mut self, reason: impl Into<String>) {
        self.rows_skipped += 1;
        self.push_reason(reason.into());
    }

    /// Record a line the source could not decode
    pub fn record_malformed(&mut self, reason: impl Into<String>) {
        self.malformed_lines += 1;
        self.push_reason(reason.into());
    }

    fn push_reason(&mut self, reason: String) {
        if self.skip_reasons.len() < MAX_RECORDED_SKIPS {
            self.skip_reasons.push(reason);
        }
    }

    /// Rows that did not become records
    pub fn total_dropped(&self) -> usize {
        self.rows_skipped + self.malformed_lines
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.records_produced as f64 / self.rows_read as f64) * 100.0
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} rows read, {} records produced, {} skipped, {} malformed ({:.1}% success)",
            self.rows_read,
            self.records_produced,
            self.rows_skipped,
            self.malformed_lines,
            self.success_rate()
        )
    }
}

impl Default for ProduceStats {
    fn default() -> Self {
        Self::new()
    }
}
