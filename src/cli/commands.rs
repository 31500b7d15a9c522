//! Command implementation for the crash uploader CLI
//!
//! Wires the CSV row source, the record producer and the streaming uploader
//! together for one upload session, and reports the outcome.

use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::app::adapters::csv_source::CsvRowSource;
use crate::app::adapters::grpc::DataTransferClient;
use crate::app::services::record_normalizer::RecordProducer;
use crate::app::services::stream_uploader::{StreamUploader, UploadSummary, upload_spinner};
use crate::cli::args::Args;

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crash_uploader={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run one upload session
///
/// Validates the arguments, opens the input file, connects to the service and
/// streams every normalized record. Returns the summary once the service has
/// answered.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<UploadSummary> {
    setup_logging(&args)?;
    args.validate()?;

    let config = args.to_config();
    info!(
        "Uploading {} to {}",
        args.input.display(),
        config.endpoint
    );

    let rows = CsvRowSource::open(&args.input, config.delimiter)?;
    let producer = RecordProducer::new(rows).with_progress_interval(config.progress_interval);

    let client = DataTransferClient::connect(&config).await?;
    let mut uploader = StreamUploader::new(client, &config);
    if args.show_progress() {
        uploader = uploader.with_progress_bar(upload_spinner(&config.endpoint));
    }

    let summary = uploader.upload(producer, cancel).await?;

    println!("{}", render_summary(&summary, args.quiet));
    Ok(summary)
}

/// Text reported on stdout for a completed upload
///
/// Quiet mode reduces this to the service's response message.
pub fn render_summary(summary: &UploadSummary, quiet: bool) -> String {
    if quiet {
        return summary.message().to_string();
    }

    let stats = &summary.produce_stats;
    let mut lines = vec![String::new()];
    if summary.succeeded() {
        lines.push("Upload complete".bright_green().bold().to_string());
    } else {
        lines.push(
            "Upload finished; service reported failure"
                .bright_yellow()
                .bold()
                .to_string(),
        );
    }
    lines.push(format!("   • Rows read: {}", stats.rows_read));
    lines.push(format!("   • Records sent: {}", summary.records_sent));
    if stats.total_dropped() > 0 {
        lines.push(format!(
            "   • Rows skipped: {}",
            stats.total_dropped().to_string().bright_yellow()
        ));
    }
    lines.push(format!(
        "   • Elapsed: {:.2}s ({:.0} records/s)",
        summary.elapsed.as_secs_f64(),
        summary.records_per_second()
    ));
    lines.push(format!("{} {}", "Server:".bright_cyan(), summary.message()));
    lines.join("\n")
}
