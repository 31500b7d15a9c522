//! Minimal `datatransfer.DataTransfer` server for tests
//!
//! Counts what arrives on each `StreamData` call and reports, per call, whether
//! the request stream ended cleanly or was aborted.

use crash_uploader::app::adapters::grpc::{CollisionRecordMsg, SendDataResponse};
use crash_uploader::constants::{SERVICE_NAME, STREAM_DATA_PATH};
use std::convert::Infallible;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::ProstCodec;
use tonic::codegen::{Body, BoxFuture, Service, StdError, empty_body, http};
use tonic::server::{ClientStreamingService, NamedService};
use tonic::{Request, Response, Status, Streaming};

/// What the server saw during one `StreamData` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seen {
    pub records: Vec<CollisionRecordMsg>,
    pub clean_end: bool,
    pub error: Option<String>,
}

/// Sends the call outcome when dropped, including when the transport drops
/// the handler after a stream reset
struct CallReport {
    seen: Seen,
    tx: mpsc::UnboundedSender<Seen>,
}

impl Drop for CallReport {
    fn drop(&mut self) {
        let _ = self.tx.send(std::mem::take(&mut self.seen));
    }
}

async fn stream_data(
    mut stream: Streaming<CollisionRecordMsg>,
    reports: mpsc::UnboundedSender<Seen>,
) -> Result<Response<SendDataResponse>, Status> {
    let mut report = CallReport {
        seen: Seen::default(),
        tx: reports,
    };

    loop {
        match stream.message().await {
            Ok(Some(msg)) => report.seen.records.push(msg),
            Ok(None) => {
                report.seen.clean_end = true;
                break;
            }
            Err(status) => {
                report.seen.error = Some(status.to_string());
                return Err(status);
            }
        }
    }

    let count = report.seen.records.len();
    Ok(Response::new(SendDataResponse {
        success: true,
        message: format!("Stream processed successfully: {} records received.", count),
    }))
}

struct StreamDataSvc(mpsc::UnboundedSender<Seen>);

impl ClientStreamingService<CollisionRecordMsg> for StreamDataSvc {
    type Response = SendDataResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<Streaming<CollisionRecordMsg>>) -> Self::Future {
        Box::pin(stream_data(request.into_inner(), self.0.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AggregationServer {
    reports: mpsc::UnboundedSender<Seen>,
}

impl<B> Service<http::Request<B>> for AggregationServer
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        match req.uri().path() {
            STREAM_DATA_PATH => {
                let svc = StreamDataSvc(self.reports.clone());
                Box::pin(async move {
                    let codec: ProstCodec<SendDataResponse, CollisionRecordMsg> =
                        ProstCodec::default();
                    let mut grpc = tonic::server::Grpc::new(codec);
                    Ok(grpc.client_streaming(svc, req).await)
                })
            }
            _ => Box::pin(async move {
                Ok(http::Response::builder()
                    .status(200)
                    .header("grpc-status", "12")
                    .header("content-type", "application/grpc")
                    .body(empty_body())
                    .unwrap())
            }),
        }
    }
}

impl NamedService for AggregationServer {
    const NAME: &'static str = SERVICE_NAME;
}

/// A running server on an ephemeral local port
pub struct Fixture {
    pub endpoint: String,
    reports: mpsc::UnboundedReceiver<Seen>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Fixture {
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            tonic::transport::Server::builder()
                .add_service(AggregationServer {
                    reports: reports_tx,
                })
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server");
        });

        Self {
            endpoint: format!("http://{}", addr),
            reports,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Outcome of the next finished call
    pub async fn next_call(&mut self) -> Seen {
        tokio::time::timeout(Duration::from_secs(10), self.reports.recv())
            .await
            .expect("server finished the call in time")
            .expect("server still running")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
