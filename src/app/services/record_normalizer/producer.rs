//! Lazy record production over a row source
//!
//! [`RecordProducer`] pulls one row at a time, normalizes it and yields the
//! resulting record. Rows with an invalid date or time are logged and skipped;
//! they never end the sequence. Only a fatal row-source failure does.

use std::iter::FusedIterator;
use tracing::{debug, error, info, warn};

use super::record_parser::normalize_row;
use super::stats::ProduceStats;
use crate::app::models::{CollisionRecord, RawRow, RowReadError};
use crate::constants::DEFAULT_PROGRESS_INTERVAL;
use crate::{Error, Result};

/// Row source item as consumed by the producer
pub type RowItem = std::result::Result<RawRow, RowReadError>;

/// Forward-only, single-pass sequence of normalized records
///
/// Memory use is one row at a time regardless of source size. Once the
/// sequence ends, either because the source is exhausted or because it failed,
/// every later call to `next` returns `None`; replaying requires a new source.
///
/// # Example
///
/// ```rust
/// use crash_uploader::RawRow;
/// use crash_uploader::app::services::record_normalizer::RecordProducer;
///
/// let rows = vec![
///     RawRow::from_pairs([("CRASH DATE", "05/17/2023"), ("CRASH TIME", "9:30")]),
///     RawRow::from_pairs([("CRASH DATE", ""), ("CRASH TIME", "9:30")]),
/// ];
/// let records: Vec<_> = RecordProducer::from_rows(rows)
///     .collect::<crash_uploader::Result<_>>()
///     .unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].crash_date, 20230517);
/// ```
#[derive(Debug)]
pub struct RecordProducer<S> {
    source: S,
    stats: ProduceStats,
    progress_interval: usize,
    finished: bool,
}

impl<S> RecordProducer<S>
where
    S: Iterator<Item = RowItem>,
{
    /// Create a producer over a fallible row source
    pub fn new(source: S) -> Self {
        Self {
            source,
            stats: ProduceStats::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            finished: false,
        }
    }

    /// Log progress every `interval` records (0 disables)
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &ProduceStats {
        &self.stats
    }

    /// Consume the producer and return its statistics
    pub fn into_stats(self) -> ProduceStats {
        self.stats
    }

    /// Whether the sequence has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn log_progress(&self) {
        if self.progress_interval > 0 && self.stats.records_produced % self.progress_interval == 0
        {
            info!("Produced {} records so far", self.stats.records_produced);
        }
    }
}

impl<I> RecordProducer<std::iter::Map<I, fn(RawRow) -> RowItem>>
where
    I: Iterator<Item = RawRow>,
{
    /// Create a producer over rows that cannot fail to read
    pub fn from_rows<R>(rows: R) -> Self
    where
        R: IntoIterator<Item = RawRow, IntoIter = I>,
    {
        RecordProducer::new(rows.into_iter().map(Ok as fn(RawRow) -> RowItem))
    }
}

impl<S> Iterator for RecordProducer<S>
where
    S: Iterator<Item = RowItem>,
{
    type Item = Result<CollisionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let row = match self.source.next() {
                None => {
                    self.finished = true;
                    debug!("Row source exhausted: {}", self.stats.summary());
                    return None;
                }
                Some(Err(RowReadError::Fatal { message })) => {
                    self.finished = true;
                    error!(
                        "Row source failed after {} rows: {}",
                        self.stats.rows_read, message
                    );
                    return Some(Err(Error::row_source(self.stats.rows_read, message)));
                }
                Some(Err(RowReadError::Malformed { line, message })) => {
                    self.stats.rows_read += 1;
                    warn!("Skipping malformed line {}: {}", line, message);
                    self.stats
                        .record_malformed(format!("Line {}: {}", line, message));
                    continue;
                }
                Some(Ok(row)) => row,
            };

            self.stats.rows_read += 1;
            let row_number = self.stats.rows_read;

            match normalize_row(&row) {
                Ok(record) => {
                    self.stats.records_produced += 1;
                    self.log_progress();
                    return Some(Ok(record));
                }
                Err(rejection) => {
                    warn!(
                        "Skipping row {} with invalid date/time ({}): {}",
                        row_number, rejection, row
                    );
                    self.stats
                        .record_skip(format!("Row {}: {}", row_number, rejection));
                }
            }
        }
    }
}

impl<S> FusedIterator for RecordProducer<S> where S: Iterator<Item = RowItem> {}
