//! Streaming upload driver
//!
//! Pulls records from a [`RecordProducer`] on a blocking worker, hands them to
//! the streaming call through a bounded channel, and waits for the single
//! aggregate response once the producer is exhausted.
//!
//! Cancellation and fatal source errors end the request stream with an `Err`
//! frame rather than a clean end, so the remote side never sees a partial
//! upload as a complete one.

use futures::{Stream, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, error, info, warn};

use super::service::AggregationService;
use super::stats::UploadSummary;
use crate::app::adapters::grpc::{CollisionRecordMsg, RecordFrame, SendDataResponse};
use crate::app::services::record_normalizer::{ProduceStats, RecordProducer, RowItem};
use crate::config::UploaderConfig;
use crate::{Error, Result};

/// Drives one client-streaming upload per call to [`upload`](Self::upload)
///
/// # Example
///
/// ```rust,no_run
/// use crash_uploader::app::adapters::csv_source::CsvRowSource;
/// use crash_uploader::app::adapters::grpc::DataTransferClient;
/// use crash_uploader::app::services::record_normalizer::RecordProducer;
/// use crash_uploader::app::services::stream_uploader::StreamUploader;
/// use crash_uploader::UploaderConfig;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> crash_uploader::Result<()> {
/// let config = UploaderConfig::default();
/// let rows = CsvRowSource::open(std::path::Path::new("data.csv"), config.delimiter)?;
/// let client = DataTransferClient::connect(&config).await?;
///
/// let mut uploader = StreamUploader::new(client, &config);
/// let summary = uploader
///     .upload(RecordProducer::new(rows), CancellationToken::new())
///     .await?;
/// println!("{}", summary.message());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StreamUploader<S> {
    service: S,
    channel_capacity: usize,
    progress: Option<ProgressBar>,
}

/// What the producer worker reports when it stops
struct FeedOutcome {
    stats: ProduceStats,
    failure: Option<Error>,
}

enum CallOutcome {
    Cancelled,
    SourceFailed,
    Finished(std::result::Result<SendDataResponse, Status>),
}

impl<S> StreamUploader<S>
where
    S: AggregationService,
{
    /// Create an uploader over an aggregation service
    pub fn new(service: S, config: &UploaderConfig) -> Self {
        Self {
            service,
            channel_capacity: config.channel_capacity.max(1),
            progress: None,
        }
    }

    /// Tick `progress` once per record handed to the call
    pub fn with_progress_bar(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Give back the underlying service
    pub fn into_inner(self) -> S {
        self.service
    }

    /// Stream every record from `producer` and return the aggregate response
    ///
    /// Records are sent in production order. An empty producer still opens and
    /// closes the call and still waits for a response. Cancelling `cancel`, or
    /// a fatal row-source failure, aborts the call without completing the
    /// stream, so no response is received in those cases.
    pub async fn upload<P>(
        &mut self,
        producer: RecordProducer<P>,
        cancel: CancellationToken,
    ) -> Result<UploadSummary>
    where
        P: Iterator<Item = RowItem> + Send + 'static,
    {
        let start = Instant::now();
        let (tx, rx) = mpsc::channel::<CollisionRecordMsg>(self.channel_capacity);
        // Fires on caller cancellation or on a fatal row-source error
        let abort = cancel.child_token();
        let sent = Arc::new(AtomicUsize::new(0));

        info!(
            "Starting streaming upload (channel capacity {})",
            self.channel_capacity
        );

        let feeder = {
            let abort = abort.clone();
            let runtime = Handle::current();
            task::spawn_blocking(move || feed_records(producer, tx, abort, runtime))
        };

        let records = {
            let sent = Arc::clone(&sent);
            let progress = self.progress.clone();
            request_stream(rx, abort.clone())
                .inspect(move |frame| {
                    if frame.is_ok() {
                        sent.fetch_add(1, Ordering::Relaxed);
                        if let Some(pb) = &progress {
                            pb.inc(1);
                        }
                    }
                })
                .boxed()
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => CallOutcome::Cancelled,
            _ = abort.cancelled() => CallOutcome::SourceFailed,
            response = self.service.stream_records(records) => CallOutcome::Finished(response),
        };

        let records_sent = sent.load(Ordering::Relaxed);
        match outcome {
            CallOutcome::Cancelled => {
                let feed = join_feeder(feeder).await?;
                warn!(
                    "Upload cancelled after {} records ({})",
                    records_sent,
                    feed.stats.summary()
                );
                self.abandon_progress("Upload cancelled");
                Err(Error::upload_cancelled(records_sent))
            }
            CallOutcome::SourceFailed => {
                let feed = join_feeder(feeder).await?;
                self.abandon_progress("Row source failed");
                Err(feed
                    .failure
                    .unwrap_or_else(|| Error::row_source(feed.stats.rows_read, "unknown failure")))
            }
            CallOutcome::Finished(Err(status)) => {
                abort.cancel();
                let feed = join_feeder(feeder).await?;
                error!(
                    "Streaming call failed after {} records: {} ({})",
                    records_sent,
                    status,
                    feed.stats.summary()
                );
                self.abandon_progress("Upload failed");
                Err(Error::upload(records_sent, status))
            }
            CallOutcome::Finished(Ok(response)) => {
                let feed = join_feeder(feeder).await?;
                if let Some(failure) = feed.failure {
                    self.abandon_progress("Row source failed");
                    return Err(failure);
                }
                if let Some(pb) = &self.progress {
                    pb.finish_with_message(format!("{} records sent", records_sent));
                }

                let summary = UploadSummary {
                    response,
                    records_sent,
                    produce_stats: feed.stats,
                    elapsed: start.elapsed(),
                };
                info!("Upload complete: {}", summary.summary());
                Ok(summary)
            }
        }
    }

    fn abandon_progress(&self, message: &'static str) {
        if let Some(pb) = &self.progress {
            pb.abandon_with_message(message);
        }
    }
}

/// Request stream over the record channel
///
/// Ends cleanly once the producer drops its sender. If `abort` fires first it
/// yields a single `Err` frame instead and then ends.
pub(crate) fn request_stream(
    rx: mpsc::Receiver<CollisionRecordMsg>,
    abort: CancellationToken,
) -> impl Stream<Item = RecordFrame> + Send + 'static {
    futures::stream::unfold(Some((rx, abort)), |state| async move {
        let (mut rx, abort) = state?;
        let next = tokio::select! {
            biased;
            _ = abort.cancelled() => None,
            msg = rx.recv() => msg,
        };

        match next {
            Some(msg) => Some((Ok(msg), Some((rx, abort)))),
            // The producer cancels `abort` before dropping its sender
            None if abort.is_cancelled() => {
                Some((Err(Status::cancelled("upload aborted by client")), None))
            }
            None => None,
        }
    })
}

/// Producer loop; runs on a blocking worker
fn feed_records<P>(
    mut producer: RecordProducer<P>,
    tx: mpsc::Sender<CollisionRecordMsg>,
    abort: CancellationToken,
    runtime: Handle,
) -> FeedOutcome
where
    P: Iterator<Item = RowItem>,
{
    while let Some(item) = producer.next() {
        let record = match item {
            Ok(record) => record,
            Err(failure) => {
                abort.cancel();
                return FeedOutcome {
                    stats: producer.into_stats(),
                    failure: Some(failure),
                };
            }
        };

        let delivered = runtime.block_on(async {
            tokio::select! {
                biased;
                _ = abort.cancelled() => false,
                sent = tx.send(CollisionRecordMsg::from(record)) => sent.is_ok(),
            }
        });
        if !delivered {
            debug!("Upload ended; stopping record production");
            break;
        }
    }

    let stats = producer.into_stats();
    debug!("Record production finished: {}", stats.summary());
    // Dropping the sender ends the request stream
    drop(tx);
    FeedOutcome {
        stats,
        failure: None,
    }
}

async fn join_feeder(feeder: task::JoinHandle<FeedOutcome>) -> Result<FeedOutcome> {
    feeder
        .await
        .map_err(|e| Error::processing_interrupted(format!("Record producer stopped: {}", e)))
}
