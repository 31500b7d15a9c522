//! Delimited-file row source
//!
//! Reads a collision-report file with a header line and yields one
//! [`RawRow`] per data line, pairing each value with its header name.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::app::models::{RawRow, RowReadError};
use crate::{Error, Result};

/// Forward-only row source over a delimited reader
///
/// Lines with fewer fields than the header simply lack the trailing columns;
/// extra fields are ignored. A line that cannot be decoded is reported as
/// [`RowReadError::Malformed`] and reading continues. An I/O failure is
/// reported once as [`RowReadError::Fatal`] and ends the source.
#[derive(Debug)]
pub struct CsvRowSource<R> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    record: csv::StringRecord,
    finished: bool,
}

impl CsvRowSource<File> {
    /// Open a file on disk
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        info!("Opening collision file: {}", path.display());

        let file = File::open(path).map_err(|e| {
            Error::io(format!("Failed to open input file {}", path.display()), e)
        })?;

        Self::from_reader(file, delimiter, path.display().to_string())
    }
}

impl<R: Read> CsvRowSource<R> {
    /// Wrap any reader; the first line must be the header
    pub fn from_reader(reader: R, delimiter: u8, source_name: impl Into<String>) -> Result<Self> {
        let source_name = source_name.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::csv_parsing(&source_name, "Failed to read CSV headers", Some(e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        debug!("{}: {} columns: {:?}", source_name, headers.len(), headers);

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
            finished: false,
        })
    }

    /// Column names from the header line
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = std::result::Result<RawRow, RowReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(RawRow::from_pairs(
                self.headers.iter().cloned().zip(self.record.iter()),
            ))),
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    self.finished = true;
                    Some(Err(RowReadError::Fatal {
                        message: e.to_string(),
                    }))
                } else {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    Some(Err(RowReadError::Malformed {
                        line,
                        message: e.to_string(),
                    }))
                }
            }
        }
    }
}
