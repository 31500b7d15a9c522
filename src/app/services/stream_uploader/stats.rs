//! Outcome of a completed streaming upload

use std::time::Duration;

use crate::app::adapters::grpc::SendDataResponse;
use crate::app::services::record_normalizer::ProduceStats;

/// Everything known about an upload that reached a response
#[derive(Debug, Clone)]
pub struct UploadSummary {
    /// The single aggregate response from the remote service
    pub response: SendDataResponse,

    /// Records pulled into the streaming call
    pub records_sent: usize,

    /// Row accounting from the record producer
    pub produce_stats: ProduceStats,

    /// Wall time from call start to response
    pub elapsed: Duration,
}

impl UploadSummary {
    /// Text the remote service returned
    pub fn message(&self) -> &str {
        &self.response.message
    }

    /// Whether the remote service reported success
    pub fn succeeded(&self) -> bool {
        self.response.success
    }

    /// Send rate over the whole call
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_sent as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} records sent in {:.2}s ({:.0} records/s); {}",
            self.records_sent,
            self.elapsed.as_secs_f64(),
            self.records_per_second(),
            self.produce_stats.summary()
        )
    }
}
