//! gRPC wire types and client for the aggregation service
//!
//! The message structs mirror `proto/data_transfer.proto` field for field and
//! are encoded with prost. [`DataTransferClient`] speaks the
//! `datatransfer.DataTransfer/StreamData` client-streaming method over a tonic
//! channel.
//!
//! The request stream carries [`RecordFrame`]s. An `Err` frame fails the
//! request body, which makes the transport reset the HTTP/2 stream, so the
//! server sees an aborted call rather than a short but complete one.

use async_trait::async_trait;
use futures::stream::BoxStream;
use prost::Message;
use tonic::Status;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

use crate::app::models::CollisionRecord;
use crate::app::services::stream_uploader::AggregationService;
use crate::config::UploaderConfig;
use crate::constants::{SERVICE_NAME, STREAM_DATA_PATH};
use crate::{Error, Result};

/// One normalized record on the wire
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CollisionRecordMsg {
    #[prost(int32, tag = "1")]
    pub crash_date: i32,
    #[prost(int32, tag = "2")]
    pub crash_time: i32,
    #[prost(int32, tag = "3")]
    pub persons_injured: i32,
    #[prost(int32, tag = "4")]
    pub persons_killed: i32,
    #[prost(int32, tag = "5")]
    pub pedestrians_injured: i32,
    #[prost(int32, tag = "6")]
    pub pedestrians_killed: i32,
    #[prost(int32, tag = "7")]
    pub cyclists_injured: i32,
    #[prost(int32, tag = "8")]
    pub cyclists_killed: i32,
    #[prost(int32, tag = "9")]
    pub motorists_injured: i32,
    #[prost(int32, tag = "10")]
    pub motorists_killed: i32,
}

/// The single aggregate response to a streaming upload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendDataResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: String,
}

impl From<CollisionRecord> for CollisionRecordMsg {
    fn from(record: CollisionRecord) -> Self {
        Self {
            crash_date: record.crash_date,
            crash_time: record.crash_time,
            persons_injured: record.persons_injured,
            persons_killed: record.persons_killed,
            pedestrians_injured: record.pedestrians_injured,
            pedestrians_killed: record.pedestrians_killed,
            cyclists_injured: record.cyclists_injured,
            cyclists_killed: record.cyclists_killed,
            motorists_injured: record.motorists_injured,
            motorists_killed: record.motorists_killed,
        }
    }
}

impl From<CollisionRecordMsg> for CollisionRecord {
    fn from(msg: CollisionRecordMsg) -> Self {
        Self {
            crash_date: msg.crash_date,
            crash_time: msg.crash_time,
            persons_injured: msg.persons_injured,
            persons_killed: msg.persons_killed,
            pedestrians_injured: msg.pedestrians_injured,
            pedestrians_killed: msg.pedestrians_killed,
            cyclists_injured: msg.cyclists_injured,
            cyclists_killed: msg.cyclists_killed,
            motorists_injured: msg.motorists_injured,
            motorists_killed: msg.motorists_killed,
        }
    }
}

/// One item of the `StreamData` request stream; `Err` aborts the call
pub type RecordFrame = std::result::Result<CollisionRecordMsg, Status>;

/// Codec for `StreamData`
///
/// Records are prost-encoded exactly like `ProstCodec` would. An `Err` frame is
/// returned as an encoding failure instead of being written.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordStreamCodec;

/// Encoder half of [`RecordStreamCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFrameEncoder;

/// Decoder half of [`RecordStreamCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl Codec for RecordStreamCodec {
    type Encode = RecordFrame;
    type Decode = SendDataResponse;
    type Encoder = RecordFrameEncoder;
    type Decoder = ResponseDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        RecordFrameEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        ResponseDecoder
    }
}

impl Encoder for RecordFrameEncoder {
    type Item = RecordFrame;
    type Error = Status;

    fn encode(
        &mut self,
        item: Self::Item,
        buf: &mut EncodeBuf<'_>,
    ) -> std::result::Result<(), Status> {
        let msg = item?;
        msg.encode(buf)
            .map_err(|e| Status::internal(format!("Failed to encode record: {}", e)))
    }
}

impl Decoder for ResponseDecoder {
    type Item = SendDataResponse;
    type Error = Status;

    fn decode(
        &mut self,
        buf: &mut DecodeBuf<'_>,
    ) -> std::result::Result<Option<Self::Item>, Status> {
        SendDataResponse::decode(buf)
            .map(Some)
            .map_err(|e| Status::internal(format!("Failed to decode response: {}", e)))
    }
}

/// Client for the `datatransfer.DataTransfer` service
#[derive(Debug, Clone)]
pub struct DataTransferClient {
    inner: tonic::client::Grpc<Channel>,
}

impl DataTransferClient {
    /// Wrap an established channel
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Connect to the endpoint named in `config`
    pub async fn connect(config: &UploaderConfig) -> Result<Self> {
        let endpoint = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|e| Error::transport(&config.endpoint, "Invalid endpoint address", Some(e)))?
            .connect_timeout(config.connect_timeout());

        info!("Connecting to {} at {}", SERVICE_NAME, config.endpoint);
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Error::transport(&config.endpoint, "Failed to connect", Some(e)))?;
        debug!("Channel established to {}", config.endpoint);

        Ok(Self::new(channel))
    }

    /// Call `StreamData` with the given request stream
    ///
    /// The call is completed when `records` ends. If `records` yields an `Err`
    /// the stream is reset instead and the call fails with that status.
    pub async fn stream_data<S>(
        &mut self,
        records: S,
    ) -> std::result::Result<tonic::Response<SendDataResponse>, Status>
    where
        S: futures::Stream<Item = RecordFrame> + Send + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("Service was not ready: {}", e)))?;

        let codec = RecordStreamCodec;
        let path = PathAndQuery::from_static(STREAM_DATA_PATH);
        self.inner
            .client_streaming(tonic::Request::new(records), path, codec)
            .await
    }
}

#[async_trait]
impl AggregationService for DataTransferClient {
    async fn stream_records(
        &mut self,
        records: BoxStream<'static, RecordFrame>,
    ) -> std::result::Result<SendDataResponse, Status> {
        let response = self.stream_data(records).await?;
        Ok(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_message_round_trips_through_model() {
        let record = CollisionRecord {
            persons_injured: 2,
            motorists_killed: 1,
            ..CollisionRecord::new(20200102, 500)
        };

        let msg = CollisionRecordMsg::from(record);
        assert_eq!(msg.crash_date, 20200102);
        assert_eq!(msg.crash_time, 500);
        assert_eq!(msg.persons_injured, 2);
        assert_eq!(msg.motorists_killed, 1);
        assert_eq!(CollisionRecord::from(msg), record);
    }

    #[test]
    fn test_record_message_wire_encoding() {
        let msg = CollisionRecordMsg::from(CollisionRecord::new(20230517, 930));
        let bytes = msg.encode_to_vec();

        // Zero counts are default values and are not written
        // field 1 varint 20230517, field 2 varint 930
        assert_eq!(bytes[0], 0x08);
        assert_eq!(CollisionRecordMsg::decode(bytes.as_slice()).unwrap(), msg);
    }

    #[test]
    fn test_response_decodes_message_field() {
        let response = SendDataResponse {
            success: true,
            message: "Stream processed successfully: 3 records received.".to_string(),
        };
        let decoded = SendDataResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert!(decoded.success);
        assert_eq!(decoded.message, response.message);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_endpoint() {
        let config = UploaderConfig::default().with_endpoint("http://[not an address");
        let result = DataTransferClient::connect(&config).await;
        assert!(matches!(result, Err(Error::Transport { .. })));
    }
}
