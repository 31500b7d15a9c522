//! Streaming upload of normalized records
//!
//! One upload is one client-streaming call: every record the producer yields
//! is sent in order, the stream is closed once the producer is exhausted, and
//! exactly one aggregate response comes back.
//!
//! ## Architecture
//!
//! - [`service`] - The remote aggregation seam
//! - [`uploader`] - Producer worker, bounded channel and call driver
//! - [`stats`] - Summary of a completed upload
//! - [`progress`] - Optional terminal spinner
//!
//! ## Flow control
//!
//! The producer runs on a blocking worker and feeds a bounded channel that the
//! call drains. When the transport stalls the channel fills and the producer
//! waits, so memory stays bounded by the channel capacity.
//!
//! ## Failure
//!
//! Any failure of the call itself, cancellation, or a fatal row-source error
//! ends the upload with an error. No partial result is reported as success
//! and nothing is retried.

pub mod progress;
pub mod service;
pub mod stats;
pub mod uploader;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use progress::upload_spinner;
pub use service::AggregationService;
pub use stats::UploadSummary;
pub use uploader::StreamUploader;
