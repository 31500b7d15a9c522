//! Tests for the stream uploader module
//!
//! The uploader is driven against an in-process aggregation service that
//! records what it receives and can be told to fail or stall.


// Test helper functions and fixtures
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::{Arc, Mutex};

use crate::app::adapters::grpc::{CollisionRecordMsg, RecordFrame, SendDataResponse};
use crate::app::models::RawRow;
use crate::app::services::stream_uploader::AggregationService;
use crate::constants::columns;

/// What the fake service saw during one call
#[derive(Debug, Default)]
pub struct Received {
    pub records: Vec<CollisionRecordMsg>,
    pub stream_ended: bool,
    pub aborted: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Drain the stream and answer with a count
    Aggregate,
    /// Fail the call once this many records have arrived
    FailAfter(usize),
    /// Stop reading once this many records have arrived and never answer
    StallAfter(usize),
}

/// In-process stand-in for the remote aggregation service
#[derive(Debug, Clone)]
pub struct FakeAggregationService {
    behavior: Behavior,
    received: Arc<Mutex<Received>>,
}

impl FakeAggregationService {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            received: Arc::new(Mutex::new(Received::default())),
        }
    }

    pub fn aggregating() -> Self {
        Self::new(Behavior::Aggregate)
    }

    /// Shared view of what has been received so far
    pub fn received(&self) -> Arc<Mutex<Received>> {
        Arc::clone(&self.received)
    }

    fn received_count(&self) -> usize {
        self.received.lock().unwrap().records.len()
    }
}

#[async_trait]
impl AggregationService for FakeAggregationService {
    async fn stream_records(
        &mut self,
        mut records: BoxStream<'static, RecordFrame>,
    ) -> Result<SendDataResponse, tonic::Status> {
        loop {
            if let Behavior::StallAfter(n) = self.behavior {
                if self.received_count() >= n {
                    futures::future::pending::<()>().await;
                }
            }

            match records.next().await {
                Some(Err(status)) => {
                    self.received.lock().unwrap().aborted = true;
                    return Err(status);
                }
                Some(Ok(msg)) => {
                    let count = {
                        let mut received = self.received.lock().unwrap();
                        received.records.push(msg);
                        received.records.len()
                    };
                    if let Behavior::FailAfter(n) = self.behavior {
                        if count >= n {
                            return Err(tonic::Status::unavailable("connection reset by peer"));
                        }
                    }
                }
                None => {
                    self.received.lock().unwrap().stream_ended = true;
                    break;
                }
            }
        }

        let count = self.received_count();
        Ok(SendDataResponse {
            success: true,
            message: format!("Stream processed successfully: {} records received.", count),
        })
    }
}

/// Row for day `day` of January 2021 at 08:05
pub fn create_dated_row(day: u32) -> RawRow {
    RawRow::from_pairs([
        (columns::CRASH_DATE, format!("01/{:02}/2021", day)),
        (columns::CRASH_TIME, "8:05".to_string()),
    ])
}
