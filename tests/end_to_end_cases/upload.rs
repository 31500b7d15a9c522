use crate::end_to_end_cases::server::Fixture;
use crash_uploader::app::adapters::grpc::{CollisionRecordMsg, DataTransferClient};
use crash_uploader::app::models::RowReadError;
use crash_uploader::app::services::record_normalizer::{RecordProducer, RowItem};
use crash_uploader::app::services::stream_uploader::StreamUploader;
use crash_uploader::constants::columns;
use crash_uploader::{CollisionRecord, Error, RawRow, UploaderConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn row(date: &str, time: &str, persons_injured: &str) -> RawRow {
    RawRow::from_pairs([
        (columns::CRASH_DATE, date),
        (columns::CRASH_TIME, time),
        (columns::PERSONS_INJURED, persons_injured),
    ])
}

async fn uploader_for(fixture: &Fixture) -> StreamUploader<DataTransferClient> {
    let config = UploaderConfig::default()
        .with_endpoint(fixture.endpoint.clone())
        .with_channel_capacity(4);
    let client = DataTransferClient::connect(&config).await.expect("connect");
    StreamUploader::new(client, &config)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_round_trip() {
    let mut fixture = Fixture::new().await;
    let mut uploader = uploader_for(&fixture).await;

    let rows = vec![
        row("1/2/2020", "5:00", "2"),
        row("", "5:00", "1"),
        row("12/31/2021", "23:59", "x"),
    ];
    let summary = uploader
        .upload(RecordProducer::from_rows(rows), CancellationToken::new())
        .await
        .expect("upload");

    assert_eq!(summary.records_sent, 2);
    assert!(summary.succeeded());
    assert_eq!(
        summary.message(),
        "Stream processed successfully: 2 records received."
    );

    let seen = fixture.next_call().await;
    assert!(seen.clean_end);
    assert_eq!(seen.error, None);
    assert_eq!(
        seen.records,
        vec![
            CollisionRecordMsg::from(CollisionRecord {
                persons_injured: 2,
                ..CollisionRecord::new(20200102, 500)
            }),
            CollisionRecordMsg::from(CollisionRecord::new(20211231, 2359)),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_stream() {
    let mut fixture = Fixture::new().await;
    let mut uploader = uploader_for(&fixture).await;

    let summary = uploader
        .upload(
            RecordProducer::from_rows(Vec::<RawRow>::new()),
            CancellationToken::new(),
        )
        .await
        .expect("upload");

    assert_eq!(summary.records_sent, 0);
    assert_eq!(
        summary.message(),
        "Stream processed successfully: 0 records received."
    );

    let seen = fixture.next_call().await;
    assert!(seen.clean_end);
    assert!(seen.records.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_resets_stream() {
    let mut fixture = Fixture::new().await;
    let mut uploader = uploader_for(&fixture).await;

    let mut day = 0;
    let endless = std::iter::repeat_with(move || {
        std::thread::sleep(Duration::from_millis(1));
        day = day % 28 + 1;
        Ok(row(&format!("01/{:02}/2021", day), "8:05", "1"))
    });

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let result = uploader.upload(RecordProducer::new(endless), cancel).await;
    assert!(
        matches!(result, Err(Error::UploadCancelled { .. })),
        "got {:?}",
        result.map(|s| s.records_sent)
    );

    let seen = fixture.next_call().await;
    assert!(!seen.clean_end, "server saw a complete stream: {:?}", seen.error);
    assert!(!seen.records.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_source_failure_resets_stream() {
    let mut fixture = Fixture::new().await;
    let mut uploader = uploader_for(&fixture).await;

    let items: Vec<RowItem> = vec![
        Ok(row("01/01/2021", "1:00", "0")),
        Ok(row("01/02/2021", "2:00", "0")),
        Err(RowReadError::Fatal {
            message: "disk went away".to_string(),
        }),
    ];
    // Let the call reach the server before the source fails
    let slow = items.into_iter().enumerate().map(|(i, item)| {
        if i == 2 {
            std::thread::sleep(Duration::from_millis(200));
        }
        item
    });

    let result = uploader
        .upload(RecordProducer::new(slow), CancellationToken::new())
        .await;
    match result {
        Err(Error::RowSource { rows_read, message }) => {
            assert_eq!(rows_read, 2);
            assert!(message.contains("disk went away"));
        }
        other => panic!("expected row source error, got {:?}", other.map(|s| s.records_sent)),
    }

    let seen = fixture.next_call().await;
    assert!(!seen.clean_end, "server saw a complete stream");
    assert!(seen.records.len() <= 2);
}
