//! Remote aggregation service seam
//!
//! The uploader only needs one operation from the remote side: accept a stream
//! of records and answer once after the stream closes. Keeping that behind a
//! trait lets the tonic client and in-process fakes share the upload loop.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::app::adapters::grpc::{RecordFrame, SendDataResponse};

/// A client-streaming aggregation endpoint
#[async_trait]
pub trait AggregationService: Send {
    /// Stream `records` in order and return the single aggregate response
    ///
    /// The call is complete when `records` ends. An `Err` item aborts the call
    /// without completing the stream; implementations must not report it to
    /// the remote side as a normal end of input.
    async fn stream_records(
        &mut self,
        records: BoxStream<'static, RecordFrame>,
    ) -> Result<SendDataResponse, tonic::Status>;
}
