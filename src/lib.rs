//! Crash Uploader Library
//!
//! A Rust library for normalizing collision-report CSV records and streaming
//! them to a remote aggregation service over a gRPC client-streaming call.
//!
//! This library provides tools for:
//! - Reading delimited collision files into ordered field-name/value rows
//! - Normalizing `MM/DD/YYYY` dates, `H:MM` times and injury counts into a fixed numeric schema
//! - Producing a lazy, single-pass sequence of normalized records
//! - Uploading that sequence over one streaming call with backpressure
//! - Comprehensive error handling that keeps bad rows local and transport failures fatal

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod record_normalizer;
        pub mod stream_uploader;
    }
    pub mod adapters {
        pub mod csv_source;
        pub mod grpc;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CollisionRecord, RawRow};
pub use config::UploaderConfig;

/// Result type alias for the crash uploader
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types for a normalization and upload session
///
/// Row-level normalization problems never appear here: they are absorbed by the
/// record producer and only ever suppress a single record.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading error that prevents the source from being opened
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// The row source failed while the upload was in progress
    #[error("Row source failed after {rows_read} rows: {message}")]
    RowSource { rows_read: usize, message: String },

    /// Could not establish the transport channel
    #[error("Transport error connecting to {endpoint}: {message}")]
    Transport {
        endpoint: String,
        message: String,
        #[source]
        source: Option<tonic::transport::Error>,
    },

    /// The remote side failed the streaming call
    #[error("Upload failed after {records_sent} records: {status}")]
    Upload {
        records_sent: usize,
        #[source]
        status: tonic::Status,
    },

    /// The upload was cancelled before the stream completed
    #[error("Upload cancelled after {records_sent} records")]
    UploadCancelled { records_sent: usize },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a row source error
    pub fn row_source(rows_read: usize, message: impl Into<String>) -> Self {
        Self::RowSource {
            rows_read,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        source: Option<tonic::transport::Error>,
    ) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an upload error from a remote status
    pub fn upload(records_sent: usize, status: tonic::Status) -> Self {
        Self::Upload {
            records_sent,
            status,
        }
    }

    /// Create an upload cancelled error
    pub fn upload_cancelled(records_sent: usize) -> Self {
        Self::UploadCancelled { records_sent }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// True when the failure came from the transport or the remote service
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Upload { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}
